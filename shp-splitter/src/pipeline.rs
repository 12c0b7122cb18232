//! Conversion complète: fichiers envoyés → archive téléchargeable
//!
//! Étapes d'un run: mise en place → lecture → nommage → (reprojection) →
//! export par feature → archive finale. Chaque run possède son répertoire
//! temporaire et son compteur de noms.

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use shpset::{Dataset, Feature, FeaturePolygon, ShpError, Upload, Workspace};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;

use crate::config::{Config, CrsPolicy, GeometryPolicy};
use crate::error::ConvertError;
use crate::export::feature_zip::export_feature_zip;
use crate::export::kml::{export_to_kml, KmlPolygon};
use crate::export::package::{entry_options, package};
use crate::export::Download;
use crate::naming::{Namer, KML_PREFIX};
use crate::report::ConversionReport;
use crate::reproject_lite::SmartReprojector;

/// Champ de nommage imposé en mode Shapefile par feature
pub const FEATURE_ZIP_NAMING_FIELD: &str = "ID";

/// Nom de l'archive produite en mode KML
pub const KML_ARCHIVE: &str = "kml_files.zip";

/// Nom de l'archive produite en mode Shapefile par feature
pub const FEATURE_ZIP_ARCHIVE: &str = "feature_zips.zip";

/// Format de sortie d'une conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMode {
    /// Un document KML par feature, reprojeté en WGS84
    Kml { naming_field: String },
    /// Un Shapefile zippé par feature, CRS source conservé
    FeatureZip,
}

impl ExportMode {
    pub fn kml(naming_field: impl Into<String>) -> Self {
        Self::Kml {
            naming_field: naming_field.into(),
        }
    }

    /// Libellé court (logs, rapport)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kml { .. } => "kml",
            Self::FeatureZip => "feature-zip",
        }
    }

    pub fn naming_field(&self) -> &str {
        match self {
            Self::Kml { naming_field } => naming_field,
            Self::FeatureZip => FEATURE_ZIP_NAMING_FIELD,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Kml { .. } => KML_PREFIX,
            Self::FeatureZip => "",
        }
    }

    /// Extension des artefacts regroupés dans l'archive finale
    fn artifact_extension(&self) -> &'static str {
        match self {
            Self::Kml { .. } => "kml",
            Self::FeatureZip => "zip",
        }
    }

    pub fn archive_name(&self) -> &'static str {
        match self {
            Self::Kml { .. } => KML_ARCHIVE,
            Self::FeatureZip => FEATURE_ZIP_ARCHIVE,
        }
    }
}

/// Demande de conversion
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Fichiers envoyés (.shp, .shx, .dbf, .prj, .cpg)
    pub uploads: Vec<Upload>,
    pub mode: ExportMode,
}

/// Résultat d'une conversion réussie
#[derive(Debug)]
pub struct Conversion {
    pub download: Download,
    pub report: ConversionReport,
}

/// Exécute les conversions, une à la fois
#[derive(Debug, Default)]
pub struct Converter {
    config: Config,
    run_lock: Mutex<()>,
}

impl Converter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convertit un jeu de données envoyé en archive téléchargeable
    ///
    /// Le répertoire temporaire du run est supprimé en sortie, succès ou erreur.
    /// Aucune archive partielle n'est produite.
    ///
    /// # Errors
    ///
    /// Retourne `ConvertError` (voir [`ConvertError::kind`]) à la première
    /// erreur, sauf géométries ignorées sous la politique `skip`.
    pub fn convert(&self, request: ConversionRequest) -> Result<Conversion, ConvertError> {
        let workspace = Workspace::create()?;
        self.convert_in(&workspace, request)
    }

    /// Comme [`Converter::convert`], dans un répertoire de travail fourni
    ///
    /// Les fichiers produits restent dans `workspace.output_dir()` jusqu'à la
    /// destruction du `Workspace`.
    pub fn convert_in(
        &self,
        workspace: &Workspace,
        request: ConversionRequest,
    ) -> Result<Conversion, ConvertError> {
        let _guard = self
            .run_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let start = Instant::now();
        let mode = &request.mode;
        let mut report = ConversionReport::new(mode);

        info!(
            mode = mode.label(),
            field = mode.naming_field(),
            uploads = request.uploads.len(),
            "Conversion started"
        );

        let dataset = shpset::load(workspace, &request.uploads)?;
        report.features_read = dataset.features.len();
        report.source_crs = dataset.crs.as_ref().map(|c| c.label());

        let mut namer = Namer::new(mode.naming_field(), mode.prefix());
        namer.check_schema(&dataset)?;

        let output_dir = workspace.output_dir()?;
        let options = entry_options(self.config.compression);

        match mode {
            ExportMode::Kml { .. } => {
                self.export_kml(&dataset, &mut namer, &output_dir, &mut report)?
            }
            ExportMode::FeatureZip => {
                self.export_feature_zips(&dataset, &mut namer, &output_dir, options, &mut report)?
            }
        }

        let download = package(
            &output_dir,
            mode.artifact_extension(),
            mode.archive_name(),
            options,
        )?;

        report.record_archive(download.filename, &download.data);
        report.set_duration(start.elapsed());
        report.finalize();

        info!(
            mode = mode.label(),
            written = report.artifacts_written,
            skipped = report.skipped.len(),
            bytes = download.data.len(),
            "Conversion done"
        );

        Ok(Conversion { download, report })
    }

    /// Un KML par feature, coordonnées en WGS84
    fn export_kml(
        &self,
        dataset: &Dataset,
        namer: &mut Namer,
        output_dir: &Path,
        report: &mut ConversionReport,
    ) -> Result<(), ConvertError> {
        let reprojector = match (&dataset.crs, self.config.crs_policy) {
            (Some(crs), _) => {
                SmartReprojector::for_crs(crs).map_err(|e| ConvertError::Reprojection {
                    crs: crs.label(),
                    reason: format!("{:#}", e),
                })?
            }
            (None, CrsPolicy::AssumeWgs84) => {
                warn!("No CRS defined, coordinates assumed to be WGS84");
                SmartReprojector::Identity
            }
            (None, CrsPolicy::Strict) => return Err(ShpError::UndefinedCrs.into()),
        };
        info!(reprojection = reprojector.description(), "Reprojection selected");
        report.reprojection = Some(reprojector.description().to_string());

        // Toutes les géométries sont reprojetées avant l'écriture du premier fichier
        let mut reprojected = Vec::with_capacity(dataset.features.len());
        for (feature, polygon) in self.polygons(dataset, namer, report)? {
            match reprojector.transform_polygon(&polygon.polygon) {
                Ok(lonlat) => reprojected.push((feature, polygon, lonlat)),
                Err(e) => {
                    let err = ConvertError::Transform {
                        feature: feature.index,
                        reason: format!("{:#}", e),
                    };
                    self.skip_or_abort(feature, namer, err, report)?;
                }
            }
        }

        for (feature, polygon, lonlat) in &reprojected {
            if polygon.hole_count() > 0 {
                debug!(feature = feature.index, holes = polygon.hole_count(), "Holes dropped");
            }

            let name = namer.next(feature)?;
            let kml = KmlPolygon {
                name: &name.value,
                exterior: lonlat.exterior(),
                altitudes: polygon.exterior_z.as_deref(),
            };
            export_to_kml(&kml, output_dir, &name.file_stem).map_err(|e| ConvertError::Write {
                path: format!("{}.kml", name.file_stem),
                reason: format!("{:#}", e),
            })?;
            report.record_artifact();
        }

        Ok(())
    }

    /// Un Shapefile zippé par feature, géométrie et CRS inchangés
    fn export_feature_zips(
        &self,
        dataset: &Dataset,
        namer: &mut Namer,
        output_dir: &Path,
        options: SimpleFileOptions,
        report: &mut ConversionReport,
    ) -> Result<(), ConvertError> {
        if dataset.crs.is_none() {
            return Err(ShpError::UndefinedCrs.into());
        }

        for (feature, _) in self.polygons(dataset, namer, report)? {
            let name = namer.next(feature)?;
            export_feature_zip(feature, &dataset.files, output_dir, &name.file_stem, options)?;
            report.record_artifact();
        }

        Ok(())
    }

    /// Polygones exploitables, dans l'ordre du jeu de données
    fn polygons<'a>(
        &self,
        dataset: &'a Dataset,
        namer: &Namer,
        report: &mut ConversionReport,
    ) -> Result<Vec<(&'a Feature, FeaturePolygon)>, ConvertError> {
        let mut polygons = Vec::with_capacity(dataset.features.len());
        for feature in &dataset.features {
            match feature.polygon() {
                Ok(polygon) => polygons.push((feature, polygon)),
                Err(e) => self.skip_or_abort(feature, namer, e.into(), report)?,
            }
        }
        Ok(polygons)
    }

    /// Applique la politique géométrique à une feature en erreur
    fn skip_or_abort(
        &self,
        feature: &Feature,
        namer: &Namer,
        error: ConvertError,
        report: &mut ConversionReport,
    ) -> Result<(), ConvertError> {
        match self.config.geometry_policy {
            GeometryPolicy::Abort => Err(error),
            GeometryPolicy::Skip => {
                warn!(feature = feature.index, error = %error, "Feature skipped");
                let value = feature.attribute_text(namer.field()).ok();
                report.record_skipped(feature.index, value, error.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_mode() {
        let kml = ExportMode::kml("NAME");
        assert_eq!(kml.naming_field(), "NAME");
        assert_eq!(kml.prefix(), "ID_");
        assert_eq!(kml.artifact_extension(), "kml");
        assert_eq!(kml.archive_name(), "kml_files.zip");

        let zip = ExportMode::FeatureZip;
        assert_eq!(zip.naming_field(), "ID");
        assert_eq!(zip.prefix(), "");
        assert_eq!(zip.artifact_extension(), "zip");
        assert_eq!(zip.archive_name(), "feature_zips.zip");
    }

    #[test]
    fn test_no_uploads() {
        let converter = Converter::default();
        let err = converter
            .convert(ConversionRequest {
                uploads: vec![],
                mode: ExportMode::kml("ID"),
            })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InputError);
    }
}
