//! Rapport de conversion
//!
//! Ce module fournit des structures pour collecter et afficher
//! le résultat d'une conversion et les features ignorées.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::pipeline::ExportMode;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionStatus {
    /// Toutes les features ont été exportées
    Success,
    /// Des features ont été ignorées (politique `skip`)
    PartialSuccess,
}

/// Feature ignorée avec sa raison
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFeature {
    /// Position dans le jeu de données
    pub index: usize,
    /// Valeur du champ de nommage, si lisible
    pub value: Option<String>,
    /// Raison
    pub reason: String,
}

/// Rapport complet d'une conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Mode d'export ("kml" ou "feature-zip")
    pub mode: &'static str,
    /// Champ de nommage
    pub naming_field: String,
    /// Statut global
    pub status: ConversionStatus,
    /// Durée de la conversion
    pub duration_secs: f64,

    /// CRS source (libellé)
    pub source_crs: Option<String>,
    /// Reprojection utilisée
    pub reprojection: Option<String>,

    /// Nombre de features lues
    pub features_read: usize,
    /// Nombre de fichiers produits
    pub artifacts_written: usize,
    /// Features ignorées
    pub skipped: Vec<SkippedFeature>,

    /// Nom de l'archive
    pub archive_name: String,
    /// Taille de l'archive en octets
    pub archive_bytes: usize,
    /// Empreinte blake3 de l'archive (hex)
    pub archive_blake3: String,
}

impl ConversionReport {
    /// Crée un nouveau rapport pour un mode d'export
    pub fn new(mode: &ExportMode) -> Self {
        Self {
            mode: mode.label(),
            naming_field: mode.naming_field().to_string(),
            status: ConversionStatus::Success,
            duration_secs: 0.0,
            source_crs: None,
            reprojection: None,
            features_read: 0,
            artifacts_written: 0,
            skipped: Vec::new(),
            archive_name: String::new(),
            archive_bytes: 0,
            archive_blake3: String::new(),
        }
    }

    /// Enregistre un fichier produit
    pub fn record_artifact(&mut self) {
        self.artifacts_written += 1;
    }

    /// Enregistre une feature ignorée
    pub fn record_skipped(&mut self, index: usize, value: Option<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedFeature {
            index,
            value,
            reason: reason.into(),
        });
    }

    /// Enregistre l'archive finale (taille + empreinte)
    pub fn record_archive(&mut self, name: &str, data: &[u8]) {
        self.archive_name = name.to_string();
        self.archive_bytes = data.len();
        self.archive_blake3 = hex::encode(blake3::hash(data).as_bytes());
    }

    /// Définit la durée de la conversion
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.skipped.is_empty() {
            ConversionStatus::Success
        } else {
            ConversionStatus::PartialSuccess
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT - {}", self.mode);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!("Naming field: {}", self.naming_field);
        println!(
            "Source CRS: {}",
            self.source_crs.as_deref().unwrap_or("undefined")
        );
        if let Some(reprojection) = &self.reprojection {
            println!("Reprojection: {}", reprojection);
        }
        println!(
            "Features: {} read, {} written, {} skipped",
            self.features_read,
            self.artifacts_written,
            self.skipped.len()
        );
        println!(
            "Archive: {} ({} bytes, blake3 {})",
            self.archive_name, self.archive_bytes, self.archive_blake3
        );

        if !self.skipped.is_empty() {
            println!("\n--- SKIPPED ({}) ---", self.skipped.len());
            for s in self.skipped.iter().take(20) {
                println!(
                    "  #{} [{}] {}",
                    s.index,
                    s.value.as_deref().unwrap_or("?"),
                    s.reason
                );
            }
            if self.skipped.len() > 20 {
                println!("  ... and {} more", self.skipped.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} written, {} skipped -> {}",
            self.mode,
            self.artifacts_written,
            self.skipped.len(),
            self.archive_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ConversionReport {
        ConversionReport::new(&ExportMode::kml("NAME"))
    }

    #[test]
    fn test_new_report() {
        let report = report();
        assert_eq!(report.mode, "kml");
        assert_eq!(report.naming_field, "NAME");
        assert_eq!(report.status, ConversionStatus::Success);
        assert_eq!(report.artifacts_written, 0);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = report();
        report.record_artifact();
        report.record_skipped(1, Some("B".into()), "feature has no geometry");
        report.finalize();

        assert_eq!(report.status, ConversionStatus::PartialSuccess);
        assert_eq!(report.skipped[0].index, 1);
    }

    #[test]
    fn test_record_archive_checksum() {
        let mut report = report();
        report.record_archive("kml_files.zip", b"abc");

        assert_eq!(report.archive_bytes, 3);
        assert_eq!(report.archive_blake3.len(), 64);
        assert_eq!(
            report.archive_blake3,
            hex::encode(blake3::hash(b"abc").as_bytes())
        );
    }

    #[test]
    fn test_summary_and_json() {
        let mut report = report();
        report.record_artifact();
        report.record_archive("kml_files.zip", b"zip");
        assert_eq!(report.summary(), "kml: 1 written, 0 skipped -> kml_files.zip");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_to_file(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["artifacts_written"], 1);
        assert_eq!(json["status"], "Success");
    }
}
