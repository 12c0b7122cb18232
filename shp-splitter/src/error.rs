//! Erreurs de conversion et messages utilisateur

use serde::Serialize;
use shpset::ShpError;
use thiserror::Error;

/// Catégorie d'erreur d'une conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Fichiers envoyés absents ou incomplets
    InputError,
    /// Jeu de données illisible
    DatasetOpenError,
    /// Champ de nommage ou CRS inutilisable
    SchemaError,
    /// Géométrie de feature inutilisable
    GeometryError,
    /// Échec de construction d'une archive
    PackagingError,
}

/// Erreur d'une conversion (le run est abandonné)
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Erreur de chargement du jeu de données
    #[error(transparent)]
    Dataset(#[from] ShpError),

    /// Impossible de construire la reprojection depuis le CRS source
    #[error("Cannot reproject from {crs} to EPSG:4326: {reason}")]
    Reprojection { crs: String, reason: String },

    /// Transformation d'une géométrie en échec
    #[error("Reprojection failed for feature #{feature}: {reason}")]
    Transform { feature: usize, reason: String },

    /// Écriture d'un fragment Shapefile en échec
    #[error("Cannot write shapefile fragment for feature #{feature}: {reason}")]
    Fragment { feature: usize, reason: String },

    /// Écriture d'un fichier produit en échec
    #[error("Cannot write {path}: {reason}")]
    Write { path: String, reason: String },

    /// Erreur d'archive ZIP
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Erreur d'I/O pendant l'écriture des fichiers produits
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Catégorie de l'erreur
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dataset(e) => match e.kind() {
                shpset::ErrorKind::Input => ErrorKind::InputError,
                shpset::ErrorKind::DatasetOpen => ErrorKind::DatasetOpenError,
                shpset::ErrorKind::Schema => ErrorKind::SchemaError,
                shpset::ErrorKind::Geometry => ErrorKind::GeometryError,
            },
            Self::Reprojection { .. } => ErrorKind::SchemaError,
            Self::Transform { .. } => ErrorKind::GeometryError,
            Self::Fragment { .. } | Self::Write { .. } | Self::Zip(_) | Self::Io(_) => {
                ErrorKind::PackagingError
            }
        }
    }

    /// Message affiché à l'utilisateur
    pub fn user_message(&self) -> String {
        match (self.kind(), self) {
            (_, Self::Dataset(ShpError::MissingPrimaryFile)) => {
                "No .shp file found in the uploaded files.".to_string()
            }
            (_, Self::Dataset(ShpError::NoFiles)) => {
                "Please upload all shapefile components (.shp, .shx, .dbf, .prj).".to_string()
            }
            (_, Self::Dataset(ShpError::MissingField { field, .. })) => format!(
                "Please check if the '{}' field (case-sensitive) exists in the shapefile.",
                field
            ),
            (ErrorKind::InputError, e) => format!("Please re-upload the shapefile: {}", e),
            (ErrorKind::DatasetOpenError, e) => {
                format!("The shapefile could not be opened: {}", e)
            }
            (ErrorKind::SchemaError, e) => format!("The shapefile cannot be converted: {}", e),
            (ErrorKind::GeometryError, e) => format!("Invalid feature geometry: {}", e),
            (ErrorKind::PackagingError, e) => format!("Failed to build the archive: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ConvertError::from(ShpError::MissingPrimaryFile).kind(),
            ErrorKind::InputError
        );
        assert_eq!(
            ConvertError::from(ShpError::UndefinedCrs).kind(),
            ErrorKind::SchemaError
        );
        assert_eq!(
            ConvertError::Reprojection {
                crs: "EPSG:99999".into(),
                reason: "unknown".into()
            }
            .kind(),
            ErrorKind::SchemaError
        );
        assert_eq!(
            ConvertError::Transform {
                feature: 1,
                reason: "NaN".into()
            }
            .kind(),
            ErrorKind::GeometryError
        );
        assert_eq!(
            ConvertError::from(std::io::Error::other("disk full")).kind(),
            ErrorKind::PackagingError
        );
    }

    #[test]
    fn test_user_message() {
        let err = ConvertError::from(ShpError::missing_field("NAME", None));
        assert_eq!(
            err.user_message(),
            "Please check if the 'NAME' field (case-sensitive) exists in the shapefile."
        );

        let err = ConvertError::from(ShpError::MissingPrimaryFile);
        assert_eq!(err.user_message(), "No .shp file found in the uploaded files.");
    }
}
