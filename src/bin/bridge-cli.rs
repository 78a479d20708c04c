use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use route_bridge::config::load_config;
use route_bridge::ipc::render;
use route_bridge::routing::{compile, split_path, RouteTable};

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Inspect route templates and response rendering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match one path against one template
    Match {
        #[arg(short, long)]
        template: String,
        #[arg(short, long)]
        path: String,
    },
    /// Resolve a path against the routes of a config file
    Routes {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Show how a JSON value is rendered in a response message
    Render {
        #[arg(short, long)]
        json: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Match { template, path } => {
            let pattern = compile(&template);
            let split = split_path(&path);
            let params = if pattern.matches(&split) {
                serde_json::to_value(pattern.extract_params(&split))?
            } else {
                Value::Null
            };
            json!({
                "parts": pattern,
                "segments": split,
                "matches": !params.is_null(),
                "params": params,
            })
        }
        Commands::Routes { config, path } => {
            let config = load_config(&config)?;
            let table = RouteTable::from_config(&config.api);
            match path {
                Some(path) => match table.resolve(&path) {
                    Some(found) => serde_json::to_value(found)?,
                    None => {
                        eprintln!("No route matches {}", path);
                        return Ok(());
                    }
                },
                None => serde_json::to_value(table.routes())?,
            }
        }
        Commands::Render { json } => {
            let value: Value = serde_json::from_str(&json)?;
            Value::String(render(&value))
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
