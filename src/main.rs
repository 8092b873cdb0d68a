use clap::{Parser, Subcommand};
use tracing::{error, info};

use songlake::config::{Config, WriteMode};
use songlake::{constants, logging, pipeline, session};

#[derive(Parser)]
#[command(name = "songlake")]
#[command(about = "Batch ETL from raw music-streaming JSON into a star-schema Parquet lake")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Override the configured rerun policy for destination tables
    #[arg(long, value_enum)]
    mode: Option<WriteMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog stage and then the event stage
    Run,
    /// Ingest only the song catalog (songs and artists dimensions)
    Catalog,
    /// Ingest only the activity log (users, time, songplays);
    /// requires a previously written songs table
    Events,
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("ETL run failed: {}", e);
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> songlake::error::Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(mode) = cli.mode {
        config.etl.write_mode = mode;
    }

    let ctx = session::get_or_create(&config)?;

    match cli.command {
        Commands::Run => {
            println!("🔄 Running catalog and event ingestion...");
            pipeline::catalog::run(&ctx, &config).await?;
            pipeline::events::run(&ctx, &config).await?;
            println!("📊 Tables written under {}:", config.destination.base);
            for table in constants::all_tables() {
                println!("   - {table}/");
            }
        }
        Commands::Catalog => {
            println!("🔄 Running catalog ingestion...");
            pipeline::catalog::run(&ctx, &config).await?;
        }
        Commands::Events => {
            println!("🔄 Running event ingestion...");
            pipeline::events::run(&ctx, &config).await?;
        }
    }

    info!("ETL run complete");
    println!("✅ Done");
    Ok(())
}
