//! Projection Lambert 93 (EPSG:2154) vers géographique
//!
//! Conique conforme sécante sur GRS80 (parallèles 44°N et 49°N, origine
//! 46.5°N / 3°E, X0 = 700 000 m, Y0 = 6 600 000 m). RGF93 est assimilé à WGS84.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ellipsoid::GRS80;
use super::Geographic;
use anyhow::{ensure, Result};

const LON0_DEG: f64 = 3.0;
const LAT0_DEG: f64 = 46.5;
const LAT1_DEG: f64 = 44.0;
const LAT2_DEG: f64 = 49.0;
const X0: f64 = 700_000.0;
const Y0: f64 = 6_600_000.0;

/// Constantes dérivées de la projection
struct Cone {
    /// Exposant
    n: f64,
    /// Constante de projection
    c: f64,
    /// Ordonnée du pôle
    ys: f64,
    /// Excentricité
    e: f64,
}

impl Cone {
    fn lambert93() -> Self {
        let e = GRS80::E2.sqrt();
        let lat1 = LAT1_DEG.to_radians();
        let lat2 = LAT2_DEG.to_radians();

        let m1 = lat1.cos() / (1.0 - GRS80::E2 * lat1.sin().powi(2)).sqrt();
        let m2 = lat2.cos() / (1.0 - GRS80::E2 * lat2.sin().powi(2)).sqrt();
        let l1 = isometric_latitude(lat1, e);
        let l2 = isometric_latitude(lat2, e);

        let n = (m1 / m2).ln() / (l2 - l1);
        let c = GRS80::A * m1 / n * (n * l1).exp();
        let ys = Y0 + c * (-n * isometric_latitude(LAT0_DEG.to_radians(), e)).exp();

        Self { n, c, ys, e }
    }
}

fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let es = e * lat.sin();
    ((FRAC_PI_4 + lat / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln()
}

/// Inverse de la latitude isométrique (point fixe)
fn latitude(iso: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso.exp().atan() - FRAC_PI_2;
    for _ in 0..20 {
        let es = e * lat.sin();
        let next = 2.0 * (((1.0 + es) / (1.0 - es)).powf(e / 2.0) * iso.exp()).atan() - FRAC_PI_2;
        if (next - lat).abs() < 1e-12 {
            return next;
        }
        lat = next;
    }
    lat
}

/// Convertit Lambert 93 vers coordonnées géographiques
pub fn lambert93_to_geographic(x: f64, y: f64) -> Result<Geographic> {
    ensure!(
        x.is_finite() && y.is_finite(),
        "Coordonnée Lambert 93 invalide: ({}, {})",
        x,
        y
    );

    let cone = Cone::lambert93();
    let dx = x - X0;
    let dy = cone.ys - y;

    let r = dx.hypot(dy);
    ensure!(r > 0.0, "Coordonnée Lambert 93 au pôle du cône: ({}, {})", x, y);

    let gamma = dx.atan2(dy);
    let lon = LON0_DEG.to_radians() + gamma / cone.n;
    let lat = latitude(-(r / cone.c).ln() / cone.n, cone.e);

    Ok(Geographic::new(lon, lat))
}
