//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

#[cfg(feature = "reproject")]
use anyhow::{Context, Result};
#[cfg(feature = "reproject")]
use geo::{Coord, LineString, Polygon};
#[cfg(feature = "reproject")]
use proj::Proj;

/// Reprojection de géométries entre deux systèmes de coordonnées
#[cfg(feature = "reproject")]
pub struct Reprojector {
    proj: Proj,
    source: String,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un nouveau reprojector entre deux définitions PROJ
    ///
    /// Les définitions acceptées sont celles de PROJ : `"EPSG:xxxx"`, WKT, PROJ string.
    /// L'ordre des axes est normalisé en (longitude, latitude).
    pub fn new(source: &str, target: &str) -> Result<Self> {
        let proj = Proj::new_known_crs(source, target, None).context(format!(
            "Failed to create projection from {} to {}",
            short(source),
            target
        ))?;

        Ok(Self {
            proj,
            source: short(source),
        })
    }

    /// Transforme une LineString (optimisé avec batch conversion)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        // Copier les coordonnées pour transformation in-place
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        // Transformation batch - beaucoup plus rapide que point par point
        self.proj
            .convert_array(&mut coords)
            .context(format!("Batch coordinate transformation failed from {}", self.source))?;

        let result: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();
        Ok(LineString::new(result))
    }

    /// Transforme un Polygon
    pub fn transform_polygon(&self, p: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors: Result<Vec<LineString>> = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }
}

/// Tronque une définition WKT pour les messages
#[cfg(feature = "reproject")]
fn short(definition: &str) -> String {
    match definition.char_indices().nth(60) {
        Some((idx, _)) => format!("{}…", &definition[..idx]),
        None => definition.to_string(),
    }
}
