// vigil/src/main.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vigil_core::application::DEFAULT_FLEET_WORKERS;

mod commands;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Scheduled Data-Quality Checks for Lender Warehouses", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 🚀 Runs every rule for every lender and raises the alert
    Run {
        /// Project directory (secrets.toml + config/rules.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Concurrent lenders (each gets its own isolated session)
        #[arg(long, env = "VIGIL_WORKERS", default_value_t = DEFAULT_FLEET_WORKERS)]
        workers: usize,
    },

    /// 🔍 Runs one lender (or ALL) against one table or all tables
    Check {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Lender id from secrets.toml, or "ALL"
        #[arg(long, short)]
        lender: String,

        /// Restrict the run to a single table from the rule catalog
        #[arg(long, short)]
        table: Option<String>,
    },

    /// 📋 Validates the rule catalog and lists any broken rules
    Rules {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug vigil run ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            workers,
        } => commands::run::execute(project_dir, workers).await?,

        Commands::Check {
            project_dir,
            lender,
            table,
        } => commands::check::execute(project_dir, lender, table).await?,

        Commands::Rules { project_dir } => commands::rules::execute(project_dir)?,
    }

    Ok(())
}
