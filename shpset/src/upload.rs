//! Mise en place des fichiers envoyés dans un répertoire temporaire
//!
//! Le répertoire est supprimé quand le [`Workspace`] est détruit, quel que soit
//! le chemin de sortie (succès, erreur, panic).

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::types::{DatasetFiles, Upload};
use crate::ShpError;

/// Extension du fichier géométrique principal
pub const PRIMARY_EXTENSION: &str = "shp";

/// Compagnons obligatoires du .shp
pub const REQUIRED_COMPANIONS: [&str; 2] = ["shx", "dbf"];

/// Répertoire de travail d'une conversion
#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    /// Crée un répertoire temporaire unique pour une conversion
    pub fn create() -> Result<Self, ShpError> {
        let root = tempfile::Builder::new()
            .prefix("shp-splitter-")
            .tempdir()?;
        debug!(path = %root.path().display(), "Workspace created");
        Ok(Self { root })
    }

    /// Racine du répertoire temporaire
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Répertoire des fichiers envoyés
    pub fn upload_dir(&self) -> PathBuf {
        self.root.path().join("upload")
    }

    /// Répertoire des fichiers produits (créé à la demande)
    pub fn output_dir(&self) -> Result<PathBuf, ShpError> {
        let dir = self.root.path().join("output");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Écrit les fichiers envoyés et identifie le jeu de données
    ///
    /// # Errors
    ///
    /// - `NoFiles` si la liste est vide
    /// - `InvalidFileName` si un nom ne désigne pas un simple fichier
    /// - `MissingPrimaryFile` si aucun .shp n'est présent
    /// - `MissingCompanions` si .shx ou .dbf manquent
    pub fn stage(&self, uploads: &[Upload]) -> Result<DatasetFiles, ShpError> {
        if uploads.is_empty() {
            return Err(ShpError::NoFiles);
        }

        let dir = self.upload_dir();
        fs::create_dir_all(&dir)?;

        let mut staged = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let name = sanitize_upload_name(&upload.name)?;
            let path = dir.join(&name);
            fs::write(&path, &upload.data)?;
            debug!(file = %name, bytes = upload.data.len(), "Upload staged");
            staged.push(path);
        }

        locate_dataset(&staged)
    }
}

/// Ne garde que le dernier composant du nom envoyé
fn sanitize_upload_name(name: &str) -> Result<String, ShpError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(ShpError::InvalidFileName(name.to_string()));
    }

    Ok(base.to_string())
}

/// Extension en minuscules d'un chemin
fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Identifie le .shp et ses compagnons parmi les fichiers mis en place
pub fn locate_dataset(files: &[PathBuf]) -> Result<DatasetFiles, ShpError> {
    let primaries: Vec<&PathBuf> = files
        .iter()
        .filter(|p| extension_lower(p).as_deref() == Some(PRIMARY_EXTENSION))
        .collect();

    let shp = match primaries.as_slice() {
        [] => return Err(ShpError::MissingPrimaryFile),
        [only] => (*only).clone(),
        [first, ..] => {
            warn!(
                count = primaries.len(),
                used = %first.display(),
                "Several .shp files uploaded, using the first one"
            );
            (*first).clone()
        }
    };

    let stem = shp
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let companion = |ext: &str| {
        files
            .iter()
            .find(|p| {
                p.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str())
                    && extension_lower(p).as_deref() == Some(ext)
            })
            .cloned()
    };

    let missing: Vec<String> = REQUIRED_COMPANIONS
        .iter()
        .filter(|ext| companion(ext).is_none())
        .map(|ext| format!("{}.{}", stem, ext))
        .collect();

    if !missing.is_empty() {
        return Err(ShpError::MissingCompanions(missing));
    }

    let (Some(shx), Some(dbf)) = (companion("shx"), companion("dbf")) else {
        return Err(ShpError::MissingCompanions(vec![format!("{}.shx", stem)]));
    };

    Ok(DatasetFiles {
        shp,
        shx,
        dbf,
        prj: companion("prj"),
        cpg: companion("cpg"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload::new(name, b"x".to_vec())
    }

    #[test]
    fn test_sanitize_upload_name() {
        assert_eq!(sanitize_upload_name("a.shp").unwrap(), "a.shp");
        assert_eq!(sanitize_upload_name("../../etc/a.shp").unwrap(), "a.shp");
        assert_eq!(sanitize_upload_name("C:\\data\\a.dbf").unwrap(), "a.dbf");
        assert!(sanitize_upload_name("..").is_err());
        assert!(sanitize_upload_name("dir/").is_err());
    }

    #[test]
    fn test_stage_complete_dataset() {
        let ws = Workspace::create().unwrap();
        let files = ws
            .stage(&[
                upload("parcels.shp"),
                upload("parcels.shx"),
                upload("parcels.DBF"),
                upload("parcels.prj"),
            ])
            .unwrap();

        assert!(files.shp.ends_with("parcels.shp"));
        assert!(files.dbf.ends_with("parcels.DBF"));
        assert!(files.prj.is_some());
        assert!(files.cpg.is_none());
        assert!(files.shp.exists());
    }

    #[test]
    fn test_stage_without_shp() {
        let ws = Workspace::create().unwrap();
        let err = ws
            .stage(&[upload("parcels.shx"), upload("parcels.dbf")])
            .unwrap_err();
        assert!(matches!(err, ShpError::MissingPrimaryFile));
    }

    #[test]
    fn test_stage_no_files() {
        let ws = Workspace::create().unwrap();
        assert!(matches!(ws.stage(&[]).unwrap_err(), ShpError::NoFiles));
    }

    #[test]
    fn test_missing_companions_listed() {
        let ws = Workspace::create().unwrap();
        let err = ws
            .stage(&[upload("parcels.shp"), upload("other.dbf")])
            .unwrap_err();
        match err {
            ShpError::MissingCompanions(missing) => {
                assert_eq!(missing, vec!["parcels.shx", "parcels.dbf"]);
            }
            other => panic!("Expected MissingCompanions, got {:?}", other),
        }
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let ws = Workspace::create().unwrap();
        let root = ws.path().to_path_buf();
        let _ = ws.stage(&[upload("lonely.shx")]);
        assert!(root.exists());
        drop(ws);
        assert!(!root.exists());
    }
}
