//! Extraction de la vue polygone d'une feature

use geo::{Coord, LineString, Polygon};
use shapefile::{PolygonRing, Shape};

use crate::types::{Feature, FeaturePolygon};
use crate::ShpError;

impl Feature {
    /// Retourne le polygone de la feature
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` si la forme n'est pas un polygone à un seul anneau
    /// extérieur d'au moins 3 sommets distincts.
    pub fn polygon(&self) -> Result<FeaturePolygon, ShpError> {
        let rings: Vec<Ring> = match &self.shape {
            Shape::Polygon(p) => p
                .rings()
                .iter()
                .map(|r| Ring::from_points(r, |pt| (pt.x, pt.y, None)))
                .collect(),
            Shape::PolygonM(p) => p
                .rings()
                .iter()
                .map(|r| Ring::from_points(r, |pt| (pt.x, pt.y, None)))
                .collect(),
            Shape::PolygonZ(p) => p
                .rings()
                .iter()
                .map(|r| Ring::from_points(r, |pt| (pt.x, pt.y, Some(pt.z))))
                .collect(),
            Shape::NullShape => {
                return Err(ShpError::invalid_geometry(self.index, "feature has no geometry"))
            }
            other => {
                return Err(ShpError::invalid_geometry(
                    self.index,
                    format!("expected a polygon, found {:?}", other.shapetype()),
                ))
            }
        };

        build_polygon(self.index, rings)
    }
}

/// Anneau intermédiaire (coordonnées + altitudes éventuelles)
struct Ring {
    outer: bool,
    coords: Vec<Coord<f64>>,
    z: Option<Vec<f64>>,
}

impl Ring {
    fn from_points<P>(ring: &PolygonRing<P>, xyz: impl Fn(&P) -> (f64, f64, Option<f64>)) -> Self {
        let (outer, points) = match ring {
            PolygonRing::Outer(points) => (true, points),
            PolygonRing::Inner(points) => (false, points),
        };

        let mut coords = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());
        let mut has_z = false;
        for point in points {
            let (x, y, pz) = xyz(point);
            coords.push(Coord { x, y });
            if let Some(pz) = pz {
                has_z = true;
                z.push(pz);
            }
        }

        Self {
            outer,
            coords,
            z: has_z.then_some(z),
        }
    }

    /// Ferme l'anneau si le dernier point diffère du premier
    fn close(&mut self) {
        if let (Some(first), Some(last)) = (self.coords.first().copied(), self.coords.last()) {
            if first != *last {
                self.coords.push(first);
                if let Some(z) = self.z.as_mut() {
                    let first_z = z.first().copied().unwrap_or_default();
                    z.push(first_z);
                }
            }
        }
    }

    fn distinct_vertices(&self) -> usize {
        let mut seen: Vec<Coord<f64>> = Vec::with_capacity(self.coords.len());
        for c in &self.coords {
            if !seen.contains(c) {
                seen.push(*c);
            }
        }
        seen.len()
    }
}

fn build_polygon(index: usize, rings: Vec<Ring>) -> Result<FeaturePolygon, ShpError> {
    let (mut outers, mut inners): (Vec<Ring>, Vec<Ring>) =
        rings.into_iter().partition(|r| r.outer);

    // Aucun anneau horaire: le premier anneau (anti-horaire) devient l'extérieur
    if outers.is_empty() && !inners.is_empty() {
        outers.push(inners.remove(0));
    }

    let mut exterior = match outers.len() {
        0 => return Err(ShpError::invalid_geometry(index, "polygon has no exterior ring")),
        1 => outers.remove(0),
        n => {
            return Err(ShpError::invalid_geometry(
                index,
                format!("multipart polygon with {} exterior rings", n),
            ))
        }
    };

    exterior.close();
    if exterior.distinct_vertices() < 3 {
        return Err(ShpError::invalid_geometry(
            index,
            "exterior ring has fewer than 3 distinct vertices",
        ));
    }

    let interiors = inners
        .into_iter()
        .map(|mut r| {
            r.close();
            LineString::new(r.coords)
        })
        .collect();

    Ok(FeaturePolygon {
        polygon: Polygon::new(LineString::new(exterior.coords), interiors),
        exterior_z: exterior.z,
    })
}
