//! Archive finale regroupant les fichiers produits
//!
//! Archive construite en mémoire, entrées à plat triées par nom, dates fixes:
//! deux runs sur la même entrée produisent les mêmes octets.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::Compression;
use crate::error::ConvertError;

/// Type MIME d'une archive ZIP
pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// Archive prête à être téléchargée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Nom de fichier fixe (`kml_files.zip` ou `feature_zips.zip`)
    pub filename: &'static str,

    /// Type MIME
    pub media_type: &'static str,

    /// Contenu de l'archive
    pub data: Vec<u8>,
}

/// Options des entrées ZIP (dates fixes pour des archives reproductibles)
pub fn entry_options(compression: Compression) -> SimpleFileOptions {
    let method = match compression {
        Compression::Deflated => CompressionMethod::Deflated,
        Compression::Stored => CompressionMethod::Stored,
    };

    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Liste les fichiers du répertoire ayant l'extension donnée, triés par nom
pub fn collect_artifacts(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Regroupe les artefacts `*.{extension}` du répertoire dans une archive en mémoire
pub fn package(
    dir: &Path,
    extension: &str,
    filename: &'static str,
    options: SimpleFileOptions,
) -> Result<Download, ConvertError> {
    let artifacts = collect_artifacts(dir, extension)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for path in &artifacts {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(path)?)?;
    }
    let data = zip.finish()?.into_inner();

    info!(
        archive = filename,
        entries = artifacts.len(),
        bytes = data.len(),
        "Archive built"
    );

    Ok(Download {
        filename,
        media_type: ZIP_MEDIA_TYPE,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ID_B.kml"), b"<kml/>").unwrap();
        std::fs::write(dir.path().join("ID_A.kml"), b"<kml/>").unwrap();
        std::fs::write(dir.path().join("ID_A.shp"), b"shp").unwrap();

        let download = package(
            dir.path(),
            "kml",
            "kml_files.zip",
            entry_options(Compression::Deflated),
        )
        .unwrap();
        assert_eq!(download.filename, "kml_files.zip");
        assert_eq!(download.media_type, "application/zip");

        let archive = zip::ZipArchive::new(Cursor::new(download.data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"ID_A.kml"));
        assert!(names.contains(&"ID_B.kml"));
    }

    #[test]
    fn test_package_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.zip"), b"one").unwrap();
        std::fs::write(dir.path().join("2.zip"), b"two").unwrap();

        let options = entry_options(Compression::Stored);
        let first = package(dir.path(), "zip", "feature_zips.zip", options).unwrap();
        let second = package(dir.path(), "zip", "feature_zips.zip", options).unwrap();
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let download = package(
            dir.path(),
            "kml",
            "kml_files.zip",
            entry_options(Compression::Deflated),
        )
        .unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(download.data)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
