//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Sources supportées vers WGS84 (EPSG:4326) :
//! - Web Mercator (EPSG:3857, alias 900913 / 3785)
//! - UTM WGS84 nord (EPSG:32601 à 32660) et sud (EPSG:32701 à 32760)
//! - Lambert 93 (EPSG:2154)
//!
//! Les autres CRS passent par PROJ (feature `reproject`).

mod ellipsoid;
mod lambert;
mod mercator;
mod smart;
mod utm;

pub use smart::SmartReprojector;

use anyhow::{bail, Result};
use geo::{Coord, LineString, Polygon};

pub use ellipsoid::{GRS80, WGS84};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// Famille de projection source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    WebMercator,
    Lambert93,
    Utm { zone: u32, south: bool },
}

impl Source {
    fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            3857 | 900913 | 3785 => Some(Self::WebMercator),
            2154 => Some(Self::Lambert93),
            32601..=32660 => Some(Self::Utm {
                zone: epsg - 32600,
                south: false,
            }),
            32701..=32760 => Some(Self::Utm {
                zone: epsg - 32700,
                south: true,
            }),
            _ => None,
        }
    }
}

/// Reprojection légère vers WGS84
pub struct ReprojectorLite {
    source_epsg: u32,
    source: Source,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector depuis un EPSG source vers EPSG:4326
    pub fn new(source_epsg: u32) -> Result<Self> {
        let Some(source) = Source::from_epsg(source_epsg) else {
            bail!(
                "EPSG:{} non supporté. Sources supportées: 3857, 2154, 326xx, 327xx",
                source_epsg
            );
        };

        Ok(Self {
            source_epsg,
            source,
        })
    }

    /// Vérifie si l'EPSG source est supporté
    pub fn is_supported_source(epsg: u32) -> bool {
        Source::from_epsg(epsg).is_some()
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Transforme un point (x, y) vers (longitude, latitude) en degrés
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let geo = match self.source {
            Source::WebMercator => mercator::web_mercator_to_geographic(x, y)?,
            Source::Lambert93 => lambert::lambert93_to_geographic(x, y)?,
            Source::Utm { zone, south } => utm::utm_to_geographic(x, y, zone, south)?,
        };
        Ok(geo.to_degrees())
    }

    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        let coords: Result<Vec<Coord>> = ls
            .coords()
            .map(|c| {
                let (x, y) = self.transform_point(c.x, c.y)?;
                Ok(Coord { x, y })
            })
            .collect();
        Ok(LineString::new(coords?))
    }

    /// Transforme un polygone (anneau extérieur et trous)
    pub fn transform_polygon(&self, poly: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(poly.exterior())?;
        let interiors: Result<Vec<LineString>> = poly
            .interiors()
            .iter()
            .map(|ring| self.transform_linestring(ring))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }
}
