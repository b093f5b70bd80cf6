mod composition;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use stratus_core::cidr::cidr_offset;
use stratus_core::config::StackConfig;
use stratus_core::document::StackDocument;
use stratus_core::preview::Preview;
use stratus_core::resource::{ComponentSource, Resource, Value};
use stratus_core::stack::Stack;
use stratus_provider_aws::{AwsNaming, validate_stack};

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Compose AWS network and secret infrastructure as a resource graph", long_about = None)]
struct Cli {
    /// Path to the stack configuration file
    #[arg(long, short, global = true, default_value = "stack.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the stack and validate it against the provider schemas
    Validate,
    /// Show the resources the stack declares, grouped by component
    Preview,
    /// Write the desired-state document for the orchestration engine
    Export {
        /// Output path of the JSON document
        #[arg(long, short, default_value = "graph.json")]
        out: PathBuf,

        /// Check that the existing document is up to date (don't write)
        #[arg(long)]
        check: bool,

        /// Show diff against the existing document
        #[arg(long)]
        diff: bool,
    },
    /// Print the stack outputs
    Outputs,
    /// Compute the subnet block at a zone index
    Cidr {
        /// Base block (e.g., 10.0.1.0/24)
        base: String,
        /// Zone index
        index: u32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate => run_validate(&cli.config),
        Commands::Preview => run_preview(&cli.config),
        Commands::Export { out, check, diff } => run_export(&cli.config, &out, check, diff),
        Commands::Outputs => run_outputs(&cli.config),
        Commands::Cidr { base, index } => run_cidr(&base, index),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_stack(config_path: &Path) -> Result<Stack, String> {
    let config = StackConfig::load(config_path).map_err(|e| e.to_string())?;
    composition::compose(&config).map_err(|e| format!("Composition error: {}", e))
}

fn validated_stack(config_path: &Path) -> Result<Stack, String> {
    let stack = load_stack(config_path)?;
    if let Err(errors) = validate_stack(&stack) {
        return Err(format!("Validation failed:\n  {}", errors.join("\n  ")));
    }
    Ok(stack)
}

fn run_validate(config_path: &Path) -> Result<(), String> {
    println!("{}", "Validating...".cyan());
    let stack = validated_stack(config_path)?;

    println!(
        "{}",
        format!("✓ {} resources validated successfully.", stack.len())
            .green()
            .bold()
    );
    for resource in stack.resources() {
        println!("  • {}", resource.id);
    }
    Ok(())
}

fn run_preview(config_path: &Path) -> Result<(), String> {
    let stack = validated_stack(config_path)?;
    let preview = Preview::new(&stack);

    println!("{}", format!("Stack {}:", stack.name()).cyan().bold());
    println!();
    for (source, resources) in preview.groups() {
        match source {
            ComponentSource::Root => println!("{}", "Root".bold()),
            ComponentSource::Component { type_token, name } => {
                println!("{} {}", name.bold(), format!("({})", type_token).dimmed())
            }
        }
        for resource in resources {
            print_resource(resource);
        }
        println!();
    }

    let summary = preview.summary();
    println!("{}", summary.to_string().bold());
    for (resource_type, count) in &summary.by_type {
        println!("  {:>3} {}", count, resource_type);
    }
    Ok(())
}

fn print_resource(resource: &Resource) {
    println!(
        "  {} {} {}",
        "+".green().bold(),
        resource.id.resource_type.cyan().bold(),
        resource.id.name
    );

    let mut keys: Vec<_> = resource.attributes.keys().collect();
    keys.sort_by(|a, b| match (a.as_str(), b.as_str()) {
        ("name", _) => std::cmp::Ordering::Less,
        (_, "name") => std::cmp::Ordering::Greater,
        _ => a.cmp(b),
    });
    for key in keys {
        let value = format_value(&resource.attributes[key]);
        if key == "name" {
            println!("      {}: {}", key.bold(), value.white().bold());
        } else {
            println!("      {}: {}", key, value.green());
        }
    }
}

fn run_export(config_path: &Path, out: &Path, check: bool, show_diff: bool) -> Result<(), String> {
    let stack = validated_stack(config_path)?;
    let rendered = StackDocument::from_stack_with(&stack, &AwsNaming::new())
        .map_err(|e| e.to_string())?
        .to_json_pretty()
        .map_err(|e| format!("Failed to serialize document: {}", e))?;

    if check || show_diff {
        let existing = if out.exists() {
            fs::read_to_string(out).map_err(|e| format!("Failed to read {}: {}", out.display(), e))?
        } else {
            String::new()
        };

        if existing != rendered && show_diff {
            print_diff(out, &existing, &rendered);
        }

        if check {
            return if existing == rendered {
                println!("{}", format!("{} is up to date.", out.display()).green());
                Ok(())
            } else {
                Err(format!("{} is out of date", out.display()))
            };
        }
    }

    fs::write(out, &rendered).map_err(|e| format!("Failed to write {}: {}", out.display(), e))?;
    println!(
        "{} {} ({} resources)",
        "Exported:".green(),
        out.display(),
        stack.len()
    );
    Ok(())
}

fn run_outputs(config_path: &Path) -> Result<(), String> {
    let stack = load_stack(config_path)?;
    println!("{}", "Outputs:".cyan().bold());
    for (name, value) in stack.outputs() {
        println!("  {}: {}", name.bold(), format_value(value));
    }
    Ok(())
}

fn run_cidr(base: &str, index: u32) -> Result<(), String> {
    let cidr = cidr_offset(base, index).map_err(|e| e.to_string())?;
    println!("{}", cidr);
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut strs: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            strs.sort();
            format!("{{{}}}", strs.join(", "))
        }
        Value::ResourceRef(binding, attr) => format!("{}.{}", binding, attr),
        Value::Derived {
            binding_name,
            attribute_name,
            transform,
        } => format!("{}.{} | {}", binding_name, attribute_name, transform.describe()),
    }
}

fn print_diff(file: &Path, original: &str, updated: &str) {
    println!("\n{} {}:", "Diff for".cyan().bold(), file.display());

    let diff = TextDiff::from_lines(original, updated);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
}
