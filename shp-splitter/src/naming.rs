//! Nommage des fichiers produits
//!
//! Le compteur appartient au [`Namer`] d'un seul run: premier usage d'une
//! valeur → `{prefix}{valeur}`, usages suivants → `{prefix}{valeur}_1`,
//! `{prefix}{valeur}_2`, ... dans l'ordre du jeu de données.

use std::collections::{HashMap, HashSet};

use shpset::{Dataset, Feature, ShpError};
use tracing::debug;

/// Préfixe des fichiers KML
pub const KML_PREFIX: &str = "ID_";

/// Compteur d'usages par nom de base (portée: un run)
#[derive(Debug, Default)]
pub struct NameCounter {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Réserve un nom unique pour une base
    ///
    /// Si un candidat suffixé est déjà pris (valeur littérale `A_1` par exemple),
    /// le suffixe continue d'augmenter.
    pub fn claim(&mut self, base: &str) -> String {
        let mut n = self.counts.get(base).copied().unwrap_or(0);
        let mut candidate = suffixed(base, n);
        while self.issued.contains(&candidate) {
            n += 1;
            candidate = suffixed(base, n);
        }

        self.counts.insert(base.to_string(), n + 1);
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Nombre de noms distribués
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

fn suffixed(base: &str, n: usize) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, n)
    }
}

/// Nom attribué à une feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureName {
    /// Valeur brute du champ de nommage (nom du placemark KML)
    pub value: String,

    /// Nom de fichier sans extension, unique dans le run
    pub file_stem: String,
}

/// Dérive les noms de fichiers depuis un champ attributaire
#[derive(Debug)]
pub struct Namer {
    field: String,
    prefix: String,
    counter: NameCounter,
}

impl Namer {
    pub fn new(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: prefix.into(),
            counter: NameCounter::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Vérifie que le champ de nommage existe dans le schéma (avant toute écriture)
    pub fn check_schema(&self, dataset: &Dataset) -> Result<(), ShpError> {
        if dataset.has_field(&self.field) {
            Ok(())
        } else {
            Err(ShpError::missing_field(&self.field, None))
        }
    }

    /// Nomme la feature suivante (à appeler dans l'ordre du jeu de données)
    pub fn next(&mut self, feature: &Feature) -> Result<FeatureName, ShpError> {
        let value = feature.attribute_text(&self.field)?;
        let base = format!("{}{}", self.prefix, sanitize_file_stem(&value));
        let file_stem = self.counter.claim(&base);

        debug!(feature = feature.index, value = %value, name = %file_stem, "Feature named");
        Ok(FeatureName { value, file_stem })
    }
}

/// Rend une valeur utilisable comme nom de fichier
///
/// Séparateurs de chemin, caractères réservés et caractères de contrôle → `_`.
pub fn sanitize_file_stem(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" => "_".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::dbase::{FieldValue, Record};
    use shapefile::Shape;

    fn feature(index: usize, id: &str) -> Feature {
        let mut record = Record::default();
        record.insert("ID".to_string(), FieldValue::Character(Some(id.to_string())));
        Feature {
            index,
            shape: Shape::NullShape,
            record,
        }
    }

    fn names(ids: &[&str]) -> Vec<String> {
        let mut namer = Namer::new("ID", KML_PREFIX);
        ids.iter()
            .enumerate()
            .map(|(i, id)| namer.next(&feature(i, id)).unwrap().file_stem)
            .collect()
    }

    #[test]
    fn test_collision_suffixes() {
        assert_eq!(names(&["A", "B", "A"]), vec!["ID_A", "ID_B", "ID_A_1"]);
        assert_eq!(
            names(&["X", "X", "X", "Y", "X"]),
            vec!["ID_X", "ID_X_1", "ID_X_2", "ID_Y", "ID_X_3"]
        );
    }

    #[test]
    fn test_literal_suffix_never_collides() {
        let result = names(&["A", "A", "A_1"]);
        assert_eq!(result, vec!["ID_A", "ID_A_1", "ID_A_1_1"]);

        let result = names(&["A_1", "A", "A"]);
        assert_eq!(result, vec!["ID_A_1", "ID_A", "ID_A_2"]);

        let unique: HashSet<_> = result.iter().collect();
        assert_eq!(unique.len(), result.len());
    }

    #[test]
    fn test_raw_value_kept() {
        let mut namer = Namer::new("ID", "");
        let name = namer.next(&feature(0, "a/b")).unwrap();
        assert_eq!(name.value, "a/b");
        assert_eq!(name.file_stem, "a_b");

        // "a_b" sanitized collides with the previous one
        let name = namer.next(&feature(1, "a_b")).unwrap();
        assert_eq!(name.file_stem, "a_b_1");
    }

    #[test]
    fn test_missing_field() {
        let mut namer = Namer::new("NAME", KML_PREFIX);
        let err = namer.next(&feature(3, "A")).unwrap_err();
        assert!(matches!(err, ShpError::MissingField { feature: Some(3), .. }));
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("12"), "12");
        assert_eq!(sanitize_file_stem("a:b*c?"), "a_b_c_");
        assert_eq!(sanitize_file_stem(".."), "__");
        assert_eq!(sanitize_file_stem(""), "_");
        assert_eq!(sanitize_file_stem("Zone Nord"), "Zone Nord");
    }

    #[test]
    fn test_counter_is_per_namer() {
        let mut first = NameCounter::new();
        assert_eq!(first.claim("ID_A"), "ID_A");
        assert_eq!(first.claim("ID_A"), "ID_A_1");
        assert_eq!(first.issued(), 2);

        let mut second = NameCounter::new();
        assert_eq!(second.claim("ID_A"), "ID_A");
    }
}
