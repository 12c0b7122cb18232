//! # shp-splitter
//!
//! Découpage d'un jeu de données Shapefile en un fichier par feature.
//!
//! ## Features
//!
//! - Export KML (un placemark polygone par document, reprojeté en WGS84)
//! - Export Shapefile par feature, zippé, CRS source conservé
//! - Noms de fichiers uniques dérivés d'un champ attributaire
//! - Archive finale reproductible + rapport de conversion
//!
//! ## Usage CLI
//!
//! ```bash
//! # Un KML par parcelle, nommé d'après le champ NAME
//! shp-splitter to-kml --input ./parcelles/ --output ./out --field NAME
//!
//! # Un Shapefile zippé par feature (champ ID)
//! shp-splitter to-feature-zips --input parcelles.shp parcelles.shx parcelles.dbf parcelles.prj --output ./out
//! ```
//!
//! ## Usage bibliothèque
//!
//! ```rust,ignore
//! use shp_splitter::{Config, ConversionRequest, Converter, ExportMode};
//!
//! let converter = Converter::new(Config::default());
//! let conversion = converter.convert(ConversionRequest {
//!     uploads,
//!     mode: ExportMode::kml("ID"),
//! })?;
//! std::fs::write(conversion.download.filename, &conversion.download.data)?;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod reproject_lite;

pub use config::Config;
pub use error::{ConvertError, ErrorKind};
pub use export::Download;
pub use pipeline::{Conversion, ConversionRequest, Converter, ExportMode};
pub use report::{ConversionReport, ConversionStatus};
pub use shpset::Upload;
