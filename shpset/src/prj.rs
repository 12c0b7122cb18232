//! Lecture du fichier .prj (WKT) et détection du code EPSG
//!
//! Ordre de détection :
//! 1. `AUTHORITY["EPSG","xxxx"]` (WKT1) ou `ID["EPSG",xxxx]` (WKT2) au premier niveau
//! 2. Noms ESRI/OGC usuels (GCS_WGS_1984, Web Mercator, UTM WGS84, Lambert 93)

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::Crs;
use crate::ShpError;

fn authority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?"#)
            .expect("valid authority regex")
    })
}

fn root_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*([A-Za-z0-9_]+)\[\s*"([^"]*)""#).expect("valid root regex")
    })
}

fn utm_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)WGS[ _]?(?:19)?84[ _/]+UTM[ _]zone[ _](\d{1,2})\s*([NS])")
            .expect("valid utm regex")
    })
}

/// Lit le .prj associé au jeu de données
///
/// Retourne `None` si le fichier est absent ou vide.
pub fn read(path: Option<&Path>) -> Result<Option<Crs>, ShpError> {
    let Some(path) = path else {
        return Ok(None);
    };

    let bytes = std::fs::read(path)
        .map_err(|e| ShpError::dataset_open(path.display().to_string(), e))?;
    let content = String::from_utf8_lossy(&bytes);

    Ok(parse(&content))
}

/// Parse un WKT de projection
pub fn parse(wkt: &str) -> Option<Crs> {
    let wkt = wkt.trim_start_matches('\u{feff}').trim();
    if wkt.is_empty() {
        return None;
    }

    let name = root_regex()
        .captures(wkt)
        .map(|c| c[2].to_string())
        .filter(|n| !n.is_empty());

    let epsg = top_level_authority(wkt).or_else(|| name.as_deref().and_then(epsg_from_name));

    Some(Crs {
        epsg,
        name,
        wkt: wkt.to_string(),
    })
}

/// Cherche l'autorité EPSG du nœud racine (profondeur 1)
fn top_level_authority(wkt: &str) -> Option<u32> {
    authority_regex()
        .captures_iter(wkt)
        .filter(|c| c.get(0).is_some_and(|m| nesting_depth(&wkt[..m.start()]) == 1))
        .filter_map(|c| c[1].parse().ok())
        .last()
}

/// Profondeur d'imbrication des crochets à la fin du préfixe
fn nesting_depth(prefix: &str) -> i32 {
    let mut depth = 0;
    let mut in_string = false;
    for c in prefix.chars() {
        match c {
            '"' => in_string = !in_string,
            '[' | '(' if !in_string => depth += 1,
            ']' | ')' if !in_string => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Correspondance nom de CRS → EPSG pour les .prj sans autorité (ESRI)
fn epsg_from_name(name: &str) -> Option<u32> {
    let normalized = name.to_ascii_uppercase().replace([' ', '-'], "_");

    match normalized.as_str() {
        "GCS_WGS_1984" | "WGS_84" | "WGS_1984" | "WGS84" => return Some(4326),
        "WGS_1984_WEB_MERCATOR_AUXILIARY_SPHERE"
        | "WGS_1984_WEB_MERCATOR"
        | "WGS_84_/_PSEUDO_MERCATOR"
        | "WGS_84_PSEUDO_MERCATOR" => return Some(3857),
        "RGF_1993_LAMBERT_93" | "RGF93_LAMBERT_93" | "RGF93_/_LAMBERT_93" | "RGF93_V1_/_LAMBERT_93" => {
            return Some(2154)
        }
        _ => {}
    }

    let caps = utm_regex().captures(name)?;
    let zone: u32 = caps[1].parse().ok()?;
    if !(1..=60).contains(&zone) {
        return None;
    }
    match caps[2].to_ascii_uppercase().as_str() {
        "N" => Some(32600 + zone),
        _ => Some(32700 + zone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESRI_WGS84: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    const OGC_WGS84: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

    const ESRI_WEB_MERCATOR: &str = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Mercator_Auxiliary_Sphere"],PARAMETER["False_Easting",0.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",0.0],PARAMETER["Standard_Parallel_1",0.0],PARAMETER["Auxiliary_Sphere_Type",0.0],UNIT["Meter",1.0]]"#;

    #[test]
    fn test_empty_prj() {
        assert!(parse("").is_none());
        assert!(parse("  \n").is_none());
    }

    #[test]
    fn test_esri_wgs84() {
        let crs = parse(ESRI_WGS84).unwrap();
        assert_eq!(crs.epsg, Some(4326));
        assert_eq!(crs.name.as_deref(), Some("GCS_WGS_1984"));
        assert!(crs.is_wgs84());
    }

    #[test]
    fn test_authority_at_root_only() {
        let crs = parse(OGC_WGS84).unwrap();
        assert_eq!(crs.epsg, Some(4326));

        // Autorités imbriquées uniquement: pas de confusion avec l'unité
        let projcs = r#"PROJCS["Custom",GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]],UNIT["metre",1,AUTHORITY["EPSG","9001"]]]"#;
        let crs = parse(projcs).unwrap();
        assert_eq!(crs.epsg, None);
        assert_eq!(crs.label(), "Custom");
        assert_eq!(crs.definition(), projcs);
    }

    #[test]
    fn test_esri_web_mercator() {
        let crs = parse(ESRI_WEB_MERCATOR).unwrap();
        assert_eq!(crs.epsg, Some(3857));
        assert!(!crs.is_wgs84());
        assert_eq!(crs.definition(), "EPSG:3857");
    }

    #[test]
    fn test_epsg_from_name() {
        assert_eq!(epsg_from_name("WGS_1984_UTM_Zone_33N"), Some(32633));
        assert_eq!(epsg_from_name("WGS 84 / UTM zone 40S"), Some(32740));
        assert_eq!(epsg_from_name("RGF_1993_Lambert_93"), Some(2154));
        assert_eq!(epsg_from_name("WGS 84 / Pseudo-Mercator"), Some(3857));
        assert_eq!(epsg_from_name("NAD_1983_StatePlane_Texas"), None);
    }

    #[test]
    fn test_wkt2_id() {
        let wkt = r#"GEOGCRS["WGS 84",DATUM["World Geodetic System 1984"],CS[ellipsoidal,2],ID["EPSG",4326]]"#;
        assert_eq!(parse(wkt).unwrap().epsg, Some(4326));
    }
}
