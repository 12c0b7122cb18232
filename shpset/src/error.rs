//! Types d'erreurs pour le crate shpset

use thiserror::Error;

/// Catégorie d'erreur présentée à l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fichiers envoyés incomplets ou invalides
    Input,
    /// Le jeu de données ne peut pas être ouvert
    DatasetOpen,
    /// Schéma attributaire ou CRS inutilisable
    Schema,
    /// Géométrie d'une feature inutilisable
    Geometry,
}

/// Erreurs pouvant survenir lors du chargement d'un Shapefile
#[derive(Debug, Error)]
pub enum ShpError {
    /// Aucun fichier envoyé
    #[error("No files were uploaded")]
    NoFiles,

    /// Nom de fichier envoyé inutilisable
    #[error("Invalid upload file name: {0:?}")]
    InvalidFileName(String),

    /// Aucun fichier .shp parmi les fichiers envoyés
    #[error("No .shp file found in the uploaded files")]
    MissingPrimaryFile,

    /// Fichiers compagnons obligatoires absents
    #[error("Missing shapefile companion files: {}", .0.join(", "))]
    MissingCompanions(Vec<String>),

    /// Erreur d'I/O lors de la mise en place des fichiers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Le lecteur Shapefile n'a pas pu ouvrir ou lire le jeu de données
    #[error("Cannot open dataset {path}: {reason}")]
    DatasetOpen { path: String, reason: String },

    /// Champ de nommage absent du schéma ou d'un enregistrement
    #[error("Field '{field}' (case-sensitive) does not exist in the shapefile{}", feature_suffix(.feature))]
    MissingField {
        field: String,
        feature: Option<usize>,
    },

    /// CRS non défini (.prj absent ou vide)
    #[error("The dataset has no coordinate reference system (.prj missing or empty)")]
    UndefinedCrs,

    /// Géométrie invalide
    #[error("Invalid geometry for feature #{feature}: {reason}")]
    InvalidGeometry { feature: usize, reason: String },
}

fn feature_suffix(feature: &Option<usize>) -> String {
    match feature {
        Some(index) => format!(" (feature #{})", index),
        None => String::new(),
    }
}

impl ShpError {
    /// Crée une erreur d'ouverture avec contexte
    pub fn dataset_open(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::DatasetOpen {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(feature: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            feature,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de champ manquant
    pub fn missing_field(field: impl Into<String>, feature: Option<usize>) -> Self {
        Self::MissingField {
            field: field.into(),
            feature,
        }
    }

    /// Catégorie de l'erreur
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFiles
            | Self::InvalidFileName(_)
            | Self::MissingPrimaryFile
            | Self::MissingCompanions(_)
            | Self::Io(_) => ErrorKind::Input,
            Self::DatasetOpen { .. } => ErrorKind::DatasetOpen,
            Self::MissingField { .. } | Self::UndefinedCrs => ErrorKind::Schema,
            Self::InvalidGeometry { .. } => ErrorKind::Geometry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(ShpError::MissingPrimaryFile.kind(), ErrorKind::Input);
        assert_eq!(
            ShpError::dataset_open("a.shp", "bad header").kind(),
            ErrorKind::DatasetOpen
        );
        assert_eq!(ShpError::UndefinedCrs.kind(), ErrorKind::Schema);
        assert_eq!(
            ShpError::invalid_geometry(3, "empty").kind(),
            ErrorKind::Geometry
        );
    }

    #[test]
    fn test_messages() {
        let err = ShpError::MissingCompanions(vec!["parcels.shx".into(), "parcels.dbf".into()]);
        assert_eq!(
            err.to_string(),
            "Missing shapefile companion files: parcels.shx, parcels.dbf"
        );

        let err = ShpError::missing_field("ID", Some(2));
        assert_eq!(
            err.to_string(),
            "Field 'ID' (case-sensitive) does not exist in the shapefile (feature #2)"
        );
        let err = ShpError::missing_field("ID", None);
        assert!(!err.to_string().contains("feature #"));
    }
}
