//! Définition et implémentation des commandes CLI
//!
//! - `to-kml`: Shapefile → un KML par feature (WGS84)
//! - `to-feature-zips`: Shapefile → un Shapefile zippé par feature

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use shp_splitter::{Config, ConversionRequest, Converter, ExportMode, Upload};
use tracing::{debug, info};

#[derive(Subcommand)]
pub enum Commands {
    /// Split a shapefile into one KML document per feature (reprojected to WGS84)
    ToKml {
        /// Shapefile components (.shp, .shx, .dbf, .prj, .cpg) or a directory holding them
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output directory for kml_files.zip
        #[arg(short, long)]
        output: PathBuf,

        /// Attribute field used to name the files (default: config naming_field, ID)
        #[arg(long)]
        field: Option<String>,
    },

    /// Split a shapefile into one zipped shapefile per feature (named after the ID field)
    ToFeatureZips {
        /// Shapefile components (.shp, .shx, .dbf, .prj, .cpg) or a directory holding them
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output directory for feature_zips.zip
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Options communes à toutes les commandes
pub struct RunOptions<'a> {
    /// Nom de preset (default/legacy/lenient) ou chemin vers un JSON
    pub config: &'a str,
    /// Chemin du rapport JSON, optionnel
    pub report: Option<&'a Path>,
}

/// Exécute une commande de conversion
pub async fn cmd_convert(command: Commands, options: RunOptions<'_>) -> Result<()> {
    let mut config = load_config(options.config)?;

    let (inputs, output, mode) = match command {
        Commands::ToKml {
            input,
            output,
            field,
        } => {
            if let Some(field) = field {
                config.naming_field = field;
            }
            let mode = ExportMode::kml(config.naming_field.clone());
            (input, output, mode)
        }
        Commands::ToFeatureZips { input, output } => (input, output, ExportMode::FeatureZip),
    };

    let files = collect_inputs(&inputs)?;
    let uploads = read_uploads(&files)?;

    println!("=== Conversion {} ===", mode.label());
    println!("Files: {}", uploads.len());
    println!("Naming field: {}", mode.naming_field());
    println!("CRS policy: {:?}", config.crs_policy);
    println!("Geometry policy: {:?}", config.geometry_policy);
    println!("Output: {}", output.display());

    let converter = Converter::new(config);
    let request = ConversionRequest { uploads, mode };

    // La conversion est synchrone: exécutée hors du runtime async
    let result = tokio::task::spawn_blocking(move || converter.convert(request))
        .await
        .context("Conversion task failed")?;

    let conversion = match result {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(anyhow::Error::new(e).context("Conversion failed"));
        }
    };

    std::fs::create_dir_all(&output)
        .context(format!("Failed to create output directory: {}", output.display()))?;
    let download_path = output.join(conversion.download.filename);
    std::fs::write(&download_path, &conversion.download.data)
        .context(format!("Failed to write {}", download_path.display()))?;

    conversion.report.display();
    if let Some(path) = options.report {
        conversion.report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    println!(
        "Export complete: {} -> {}",
        conversion.report.summary(),
        download_path.display()
    );

    Ok(())
}

/// Charge la configuration puis applique les variables d'environnement
fn load_config(preset_or_path: &str) -> Result<Config> {
    Config::resolve(preset_or_path)
        .context(format!("Failed to load config '{}'", preset_or_path))?
        .with_env_overrides()
}

/// Développe les répertoires en fichiers (non récursif), triés par nom
fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .context(format!("Failed to read directory: {}", path.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        anyhow::bail!("No input files found");
    }

    Ok(files)
}

/// Lit les fichiers comme des envois utilisateur
fn read_uploads(files: &[PathBuf]) -> Result<Vec<Upload>> {
    files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context(format!("Invalid file name: {}", path.display()))?;
            let data =
                std::fs::read(path).context(format!("Failed to read {}", path.display()))?;
            debug!(file = name, bytes = data.len(), "Input read");
            Ok(Upload::new(name, data))
        })
        .collect()
}
