//! Export d'une feature en document KML (un placemark polygone)
//!
//! Seul l'anneau extérieur est écrit: les trous ne sont pas représentés.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::LineString;

/// Polygone prêt à être écrit (coordonnées déjà en WGS84)
#[derive(Debug, Clone, Copy)]
pub struct KmlPolygon<'a> {
    /// Nom du placemark (valeur brute du champ de nommage)
    pub name: &'a str,

    /// Anneau extérieur en (longitude, latitude)
    pub exterior: &'a LineString<f64>,

    /// Altitudes de l'anneau extérieur, si la source en a
    pub altitudes: Option<&'a [f64]>,
}

/// Écrit `{output_dir}/{file_stem}.kml` et retourne son chemin
pub fn export_to_kml(polygon: &KmlPolygon<'_>, output_dir: &Path, file_stem: &str) -> Result<PathBuf> {
    let output_path = output_dir.join(format!("{}.kml", file_stem));
    let file = File::create(&output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_document(&mut writer, polygon)?;
    writer.flush()?;

    Ok(output_path)
}

/// Écrit le document KML complet
fn write_document<W: Write>(writer: &mut W, polygon: &KmlPolygon<'_>) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
    writeln!(writer, "  <Document>")?;
    writeln!(writer, "    <Placemark>")?;
    writeln!(writer, "      <name>{}</name>", escape_xml(polygon.name))?;
    writeln!(writer, "      <Polygon>")?;
    writeln!(writer, "        <outerBoundaryIs>")?;
    writeln!(writer, "          <LinearRing>")?;
    write!(writer, "            <coordinates>")?;
    write_coordinates(writer, polygon.exterior, polygon.altitudes)?;
    writeln!(writer, "</coordinates>")?;
    writeln!(writer, "          </LinearRing>")?;
    writeln!(writer, "        </outerBoundaryIs>")?;
    writeln!(writer, "      </Polygon>")?;
    writeln!(writer, "    </Placemark>")?;
    writeln!(writer, "  </Document>")?;
    writeln!(writer, "</kml>")?;
    Ok(())
}

/// Tuples `lon,lat` ou `lon,lat,alt` séparés par des espaces, ordre conservé
fn write_coordinates<W: Write>(
    writer: &mut W,
    ring: &LineString<f64>,
    altitudes: Option<&[f64]>,
) -> Result<()> {
    for (i, c) in ring.0.iter().enumerate() {
        if i > 0 {
            write!(writer, " ")?;
        }
        match altitudes.and_then(|z| z.get(i)) {
            Some(z) => write!(writer, "{},{},{}", c.x, c.y, z)?,
            None => write!(writer, "{},{}", c.x, c.y)?,
        }
    }
    Ok(())
}

/// Échappe une chaîne pour du texte XML
fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c if c.is_control() && c != '\t' && c != '\n' && c != '\r' => {}
            c => result.push(c),
        }
    }
    result
}
