//! Export d'une feature en Shapefile autonome, zippé
//!
//! Fragment écrit: `.shp`, `.shx`, `.dbf` (schéma de la table source), `.prj`
//! et `.cpg` copiés depuis la source. Géométrie et CRS sont conservés tels quels.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use shapefile::{dbase, Shape};
use shpset::{DatasetFiles, Feature};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::ConvertError;

/// Extensions archivées pour chaque feature
pub const FRAGMENT_EXTENSIONS: [&str; 5] = ["shp", "cpg", "dbf", "prj", "shx"];

/// Écrit le fragment Shapefile d'une feature puis son archive `{file_stem}.zip`
pub fn export_feature_zip(
    feature: &Feature,
    source: &DatasetFiles,
    output_dir: &Path,
    file_stem: &str,
    options: SimpleFileOptions,
) -> Result<PathBuf, ConvertError> {
    write_fragment(feature, source, output_dir, file_stem)?;
    zip_fragment(output_dir, file_stem, options)
}

/// Écrit le Shapefile mono-feature `{output_dir}/{file_stem}.*`
fn write_fragment(
    feature: &Feature,
    source: &DatasetFiles,
    output_dir: &Path,
    file_stem: &str,
) -> Result<(), ConvertError> {
    let fragment_error = |reason: String| ConvertError::Fragment {
        feature: feature.index,
        reason,
    };

    let table_reader =
        dbase::Reader::from_path(&source.dbf).map_err(|e| fragment_error(e.to_string()))?;
    let table = dbase::TableWriterBuilder::from_reader(table_reader);

    let shp_path = output_dir.join(format!("{}.shp", file_stem));
    {
        let mut writer = shapefile::Writer::from_path(&shp_path, table)
            .map_err(|e| fragment_error(e.to_string()))?;
        let written = match &feature.shape {
            Shape::Polygon(p) => writer.write_shape_and_record(p, &feature.record),
            Shape::PolygonM(p) => writer.write_shape_and_record(p, &feature.record),
            Shape::PolygonZ(p) => writer.write_shape_and_record(p, &feature.record),
            other => {
                return Err(fragment_error(format!(
                    "unsupported shape type {:?}",
                    other.shapetype()
                )))
            }
        };
        written.map_err(|e| fragment_error(e.to_string()))?;
    }

    if let Some(prj) = &source.prj {
        std::fs::copy(prj, output_dir.join(format!("{}.prj", file_stem)))?;
    }
    if let Some(cpg) = &source.cpg {
        std::fs::copy(cpg, output_dir.join(format!("{}.cpg", file_stem)))?;
    }

    Ok(())
}

/// Archive les fichiers existants du fragment; les compagnons absents sont ignorés
fn zip_fragment(
    output_dir: &Path,
    file_stem: &str,
    options: SimpleFileOptions,
) -> Result<PathBuf, ConvertError> {
    let zip_path = output_dir.join(format!("{}.zip", file_stem));
    let mut zip = ZipWriter::new(File::create(&zip_path)?);

    for ext in FRAGMENT_EXTENSIONS {
        let name = format!("{}.{}", file_stem, ext);
        let path = output_dir.join(&name);
        if !path.is_file() {
            debug!(file = %name, "Fragment file absent, skipped");
            continue;
        }

        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(&path)?)?;
    }

    zip.finish()?;
    Ok(zip_path)
}
