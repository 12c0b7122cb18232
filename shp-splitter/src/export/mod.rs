//! Modules d'export (KML, Shapefile par feature, archive finale)

pub mod feature_zip;
pub mod kml;
pub mod package;
pub mod reproject;

pub use package::Download;
