//! Configuration des conversions

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};

/// Champ de nommage par défaut
pub const DEFAULT_NAMING_FIELD: &str = "ID";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Champ attributaire utilisé pour nommer les fichiers KML
    #[serde(default = "default_naming_field")]
    pub naming_field: String,

    /// Traitement d'un CRS non défini
    #[serde(default)]
    pub crs_policy: CrsPolicy,

    /// Traitement d'une géométrie inutilisable
    #[serde(default)]
    pub geometry_policy: GeometryPolicy,

    /// Compression des archives produites
    #[serde(default)]
    pub compression: Compression,
}

/// Politique pour un jeu de données sans CRS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrsPolicy {
    /// CRS absent = erreur de schéma (défaut)
    #[default]
    Strict,
    /// Export KML: CRS absent traité comme déjà en WGS84
    AssumeWgs84,
}

/// Politique pour une feature sans polygone exploitable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryPolicy {
    /// Première géométrie invalide = abandon du run (défaut)
    #[default]
    Abort,
    /// Feature ignorée avec un warning, reportée dans le rapport
    Skip,
}

/// Méthode de compression des entrées ZIP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl std::str::FromStr for CrsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" | "error" => Ok(CrsPolicy::Strict),
            "assume-wgs84" | "assume_wgs84" | "wgs84" => Ok(CrsPolicy::AssumeWgs84),
            _ => Err(format!("Invalid CRS policy: {}. Use: strict, assume-wgs84", s)),
        }
    }
}

impl std::str::FromStr for GeometryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" | "error" => Ok(GeometryPolicy::Abort),
            "skip" | "warn" => Ok(GeometryPolicy::Skip),
            _ => Err(format!("Invalid geometry policy: {}. Use: abort, skip", s)),
        }
    }
}

fn default_naming_field() -> String {
    DEFAULT_NAMING_FIELD.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            naming_field: default_naming_field(),
            crs_policy: CrsPolicy::default(),
            geometry_policy: GeometryPolicy::default(),
            compression: Compression::default(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "legacy" => Self::load_embedded(include_str!("presets/legacy.json")),
            "lenient" => Self::load_embedded(include_str!("presets/lenient.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default, legacy, lenient", preset),
        }
    }

    /// Résout un nom de preset ou un chemin vers un fichier JSON
    pub fn resolve(preset_or_path: &str) -> Result<Self> {
        let path = Path::new(preset_or_path);
        if path.extension().is_some_and(|e| e == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(preset_or_path)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les surcharges des variables d'environnement
    ///
    /// - `SHP_SPLITTER_NAMING_FIELD`
    /// - `SHP_SPLITTER_CRS_POLICY` (strict, assume-wgs84)
    /// - `SHP_SPLITTER_GEOMETRY_POLICY` (abort, skip)
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(field) = std::env::var("SHP_SPLITTER_NAMING_FIELD") {
            if !field.trim().is_empty() {
                self.naming_field = field.trim().to_string();
            }
        }
        if let Ok(policy) = std::env::var("SHP_SPLITTER_CRS_POLICY") {
            self.crs_policy = policy.parse().map_err(anyhow::Error::msg)?;
        }
        if let Ok(policy) = std::env::var("SHP_SPLITTER_GEOMETRY_POLICY") {
            self.geometry_policy = policy.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(self)
    }
}
