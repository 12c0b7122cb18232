//! # shpset
//!
//! Mise en place et lecture de jeux de données ESRI Shapefile envoyés par un utilisateur.
//!
//! ## Features
//!
//! - Écriture des fichiers envoyés dans un répertoire temporaire auto-nettoyé
//! - Détection du `.shp` principal et validation des compagnons `.shx` / `.dbf`
//! - Détection du CRS depuis le `.prj` (autorité EPSG ou noms ESRI usuels)
//! - Vue polygone des features avec types `geo`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shpset::{Upload, Workspace};
//!
//! let workspace = Workspace::create()?;
//! let files = workspace.stage(&uploads)?;
//! let dataset = shpset::read(&files)?;
//!
//! for feature in &dataset.features {
//!     let polygon = feature.polygon()?;
//!     println!("{}: {} vertices", feature.attribute_text("ID")?, polygon.exterior().0.len());
//! }
//! ```

pub mod attributes;
pub mod error;
pub mod geometry;
pub mod prj;
pub mod reader;
pub mod types;
pub mod upload;

pub use error::{ErrorKind, ShpError};
pub use reader::read;
pub use types::{Crs, Dataset, DatasetFiles, Feature, FeaturePolygon, Upload};
pub use upload::Workspace;

/// Met en place les fichiers envoyés puis lit le jeu de données
///
/// # Errors
///
/// Retourne `ShpError` si les fichiers sont incomplets ou illisibles.
pub fn load(workspace: &Workspace, uploads: &[Upload]) -> Result<Dataset, ShpError> {
    let files = workspace.stage(uploads)?;
    read(&files)
}
