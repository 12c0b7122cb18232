//! Projection Web Mercator (EPSG:3857) vers géographique
//!
//! Modèle sphérique de rayon égal au demi-grand axe WGS84.

use super::ellipsoid::WGS84;
use super::Geographic;
use anyhow::{ensure, Result};

/// Demi-étendue de la projection en mètres (π · R)
pub const HALF_EXTENT: f64 = std::f64::consts::PI * WGS84::A;

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Result<Geographic> {
    ensure!(
        x.is_finite() && y.is_finite(),
        "Coordonnée Web Mercator invalide: ({}, {})",
        x,
        y
    );

    let r = WGS84::A;

    // Longitude = x / R
    let lon = x / r;

    // Latitude = 2 * atan(exp(y/R)) - π/2
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Ok(Geographic::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let (lon, lat) = web_mercator_to_geographic(0.0, 0.0).unwrap().to_degrees();
        assert!(lon.abs() < 1e-12);
        assert!(lat.abs() < 1e-12);
    }

    #[test]
    fn test_extent_maps_to_antimeridian() {
        let (lon, lat) = web_mercator_to_geographic(HALF_EXTENT, HALF_EXTENT)
            .unwrap()
            .to_degrees();
        assert!((lon - 180.0).abs() < 1e-9, "lon={}", lon);
        // Limite de latitude du Web Mercator
        assert!((lat - 85.0511).abs() < 0.001, "lat={}", lat);
    }

    #[test]
    fn test_nan_rejected() {
        assert!(web_mercator_to_geographic(f64::NAN, 0.0).is_err());
    }
}
