//! Types de données pour le crate shpset

use std::path::PathBuf;

use geo::{LineString, Polygon};
use shapefile::dbase::Record;
use shapefile::Shape;

/// Fichier envoyé par l'utilisateur (nom d'origine + contenu)
#[derive(Debug, Clone)]
pub struct Upload {
    /// Nom du fichier tel qu'envoyé (ex: "parcelles.shp")
    pub name: String,

    /// Contenu brut
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Chemins des fichiers d'un jeu de données Shapefile
#[derive(Debug, Clone)]
pub struct DatasetFiles {
    /// Fichier géométrique principal (.shp)
    pub shp: PathBuf,

    /// Index des géométries (.shx)
    pub shx: PathBuf,

    /// Table attributaire (.dbf)
    pub dbf: PathBuf,

    /// Projection (.prj), optionnelle
    pub prj: Option<PathBuf>,

    /// Encodage de la table (.cpg), optionnel
    pub cpg: Option<PathBuf>,
}

/// Jeu de données chargé
#[derive(Debug)]
pub struct Dataset {
    /// Features dans l'ordre du fichier
    pub features: Vec<Feature>,

    /// Système de coordonnées (None si .prj absent ou vide)
    pub crs: Option<Crs>,

    /// Noms des champs de la table attributaire
    pub fields: Vec<String>,

    /// Fichiers source
    pub files: DatasetFiles,
}

impl Dataset {
    /// Vérifie la présence d'un champ dans le schéma (sensible à la casse)
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// Une feature: géométrie brute + attributs
pub struct Feature {
    /// Position dans le jeu de données (0-based)
    pub index: usize,

    /// Géométrie telle que lue dans le .shp
    pub shape: Shape,

    /// Enregistrement dBASE associé
    pub record: Record,
}

// `shapefile::Shape` n'implémente pas `Debug` (0.6): on passe par `Display`
impl std::fmt::Debug for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feature")
            .field("index", &self.index)
            .field("shape", &format_args!("{}", self.shape))
            .field("record", &self.record)
            .finish()
    }
}

/// Système de coordonnées lu depuis le .prj
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    /// Code EPSG détecté (None si non identifiable)
    pub epsg: Option<u32>,

    /// Nom de premier niveau du WKT (ex: "GCS_WGS_1984")
    pub name: Option<String>,

    /// Contenu WKT brut
    pub wkt: String,
}

impl Crs {
    /// EPSG:4326 (WGS84 géographique)
    pub const WGS84_EPSG: u32 = 4326;

    /// Vérifie si le CRS est WGS84 géographique
    pub fn is_wgs84(&self) -> bool {
        self.epsg == Some(Self::WGS84_EPSG)
    }

    /// Définition utilisable par PROJ ("EPSG:xxxx" ou WKT brut)
    pub fn definition(&self) -> String {
        match self.epsg {
            Some(epsg) => format!("EPSG:{}", epsg),
            None => self.wkt.clone(),
        }
    }

    /// Libellé court pour les logs et le rapport
    pub fn label(&self) -> String {
        match (self.epsg, &self.name) {
            (Some(epsg), _) => format!("EPSG:{}", epsg),
            (None, Some(name)) => name.clone(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// Vue polygone d'une feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePolygon {
    /// Anneau extérieur + trous
    pub polygon: Polygon<f64>,

    /// Altitudes de l'anneau extérieur (PolygonZ uniquement)
    pub exterior_z: Option<Vec<f64>>,
}

impl FeaturePolygon {
    pub fn exterior(&self) -> &LineString<f64> {
        self.polygon.exterior()
    }

    /// Nombre de trous (non représentés en KML)
    pub fn hole_count(&self) -> usize {
        self.polygon.interiors().len()
    }
}
