//! Point d'entrée CLI pour shp-splitter

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, RunOptions};

/// Découper un Shapefile en un fichier par feature (KML ou Shapefile zippé)
#[derive(Parser)]
#[command(name = "shp-splitter")]
#[command(author, version)]
#[command(about = "Découper un Shapefile en un KML ou un Shapefile zippé par feature")]
#[command(long_about = "Découpe un jeu de données Shapefile (.shp/.shx/.dbf/.prj) en un fichier par feature.\n\n'to-kml' produit kml_files.zip (WGS84), 'to-feature-zips' produit feature_zips.zip (CRS source).")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config preset name (default/legacy/lenient) or path to a JSON config
    #[arg(long, default_value = "default", global = true)]
    config: String,

    /// Write the conversion report as JSON to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let options = RunOptions {
        config: &cli.config,
        report: cli.report.as_deref(),
    };
    cli::cmd_convert(cli.command, options).await
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
