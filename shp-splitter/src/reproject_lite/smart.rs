//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible pour amener un CRS
//! source en WGS84 (EPSG:4326).

use super::ReprojectorLite;
use anyhow::{bail, Result};
use geo::Polygon;
use shpset::Crs;

/// Définition PROJ de la cible
pub const TARGET: &str = "EPSG:4326";

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::export::reproject::Reprojector),
    /// Pas de reprojection (source déjà en WGS84)
    Identity,
}

impl SmartReprojector {
    /// Crée un reprojector depuis le CRS du jeu de données vers WGS84
    pub fn for_crs(crs: &Crs) -> Result<Self> {
        // Pas de reprojection nécessaire
        if crs.is_wgs84() {
            return Ok(Self::Identity);
        }

        // Essayer reproject_lite d'abord
        if let Some(epsg) = crs.epsg.filter(|e| ReprojectorLite::is_supported_source(*e)) {
            return Ok(Self::Lite(ReprojectorLite::new(epsg)?));
        }

        // Fallback sur proj si disponible
        #[cfg(feature = "reproject")]
        {
            let proj = crate::export::reproject::Reprojector::new(&crs.definition(), TARGET)?;
            return Ok(Self::Proj(proj));
        }

        // Aucune option disponible
        #[cfg(not(feature = "reproject"))]
        bail!(
            "Reprojection {} → {} non supportée.\n\
             Projections supportées (reproject_lite) : 3857 (Web Mercator), 2154 (Lambert 93), 326xx/327xx (UTM WGS84).\n\
             Pour d'autres projections, compilez avec: cargo build --features reproject",
            crs.label(),
            TARGET
        );
    }

    /// Transforme un polygone et vérifie que le résultat est en degrés valides
    pub fn transform_polygon(&self, poly: &Polygon) -> Result<Polygon> {
        let result = match self {
            Self::Identity => return Ok(poly.clone()),
            Self::Lite(lite) => lite.transform_polygon(poly)?,
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_polygon(poly)?,
        };

        check_geographic(&result)?;
        Ok(result)
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (pas de reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}

/// Vérifie que toutes les coordonnées sont des longitudes/latitudes valides
fn check_geographic(poly: &Polygon) -> Result<()> {
    let rings = std::iter::once(poly.exterior()).chain(poly.interiors());
    for c in rings.flat_map(|r| r.coords()) {
        if !c.x.is_finite() || !c.y.is_finite() {
            bail!("non-finite coordinate ({}, {})", c.x, c.y);
        }
        if !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y) {
            bail!("coordinate out of longitude/latitude range ({}, {})", c.x, c.y);
        }
    }
    Ok(())
}
