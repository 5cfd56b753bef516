mod console;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tessera_core::kernel::error::Result;
use tessera_core::kernel::{create_renderer, Mode, OptionsDocument};
use tessera_core::services::{ComponentTree, DefaultSchemaService, SchemaService};

use console::ConsoleAdapter;
use core_logging::LoggingPlugin;

/// Tessera: schema-driven renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render an application document as a component outline
    Render {
        /// Application document (.json, .yaml, .yml or .toml)
        file: PathBuf,
        /// Override the document's mode (development or production)
        #[arg(long)]
        mode: Option<String>,
        /// Log level or filter directive; RUST_LOG takes precedence
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Check an application document without rendering it
    Validate {
        /// Application document (.json, .yaml, .yml or .toml)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let result = match args.command {
        Commands::Render {
            file,
            mode,
            log_level,
        } => render(&file, mode.as_deref(), log_level).await,
        Commands::Validate { file } => validate(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn render(file: &Path, mode: Option<&str>, log_level: Option<String>) -> Result<()> {
    let mut options = OptionsDocument::load(file)?.into_options();
    if let Some(mode) = mode {
        options.mode = Some(mode.parse::<Mode>()?);
    }
    match log_level {
        Some(level) => {
            options.config.insert(core_logging::LEVEL_KEY.to_string(), json!(level));
        }
        None => {
            options
                .config
                .entry(core_logging::LEVEL_KEY.to_string())
                .or_insert_with(|| json!("warn"));
        }
    }
    // Installed first so the rest of the bootstrap is logged.
    options.plugins.insert(0, Arc::new(LoggingPlugin));

    let app = create_renderer(ConsoleAdapter).create(options).await?;

    print!("{}", app.outline());
    println!("Mode: {}", app.mode());
    println!("Phase: {}", app.phase());
    let packages: Vec<String> = app
        .package_manager()
        .loaded_packages()
        .iter()
        .map(|p| p.id())
        .collect();
    if packages.is_empty() {
        println!("Packages: none");
    } else {
        println!("Packages: {}", packages.join(", "));
    }
    Ok(())
}

fn validate(file: &Path) -> Result<()> {
    let document = OptionsDocument::load(file)?;
    DefaultSchemaService::new().initialize(document.schema.clone())?;
    let tree = ComponentTree::from_schema(&document.schema)?;
    println!(
        "{}: ok ({} components, {} packages, mode {})",
        file.display(),
        tree.node_count(),
        document.packages.len(),
        document.mode.unwrap_or_default()
    );
    Ok(())
}
