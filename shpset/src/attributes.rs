//! Rendu texte des valeurs attributaires dBASE

use shapefile::dbase::FieldValue;

use crate::types::Feature;
use crate::ShpError;

/// Texte utilisé pour une valeur nulle
pub const NULL_TEXT: &str = "NULL";

impl Feature {
    /// Valeur texte d'un champ
    ///
    /// # Errors
    ///
    /// `MissingField` si l'enregistrement ne contient pas le champ.
    pub fn attribute_text(&self, field: &str) -> Result<String, ShpError> {
        self.record
            .get(field)
            .map(field_value_text)
            .ok_or_else(|| ShpError::missing_field(field, Some(self.index)))
    }
}

/// Convertit une valeur dBASE en texte
///
/// Les numériques entiers sont écrits sans décimales (`12.0` → `"12"`).
pub fn field_value_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Character(Some(s)) => s.trim().to_string(),
        FieldValue::Numeric(Some(n)) => number_text(*n),
        FieldValue::Float(Some(f)) => number_text(f64::from(*f)),
        FieldValue::Double(d) => number_text(*d),
        FieldValue::Currency(c) => number_text(*c),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Logical(Some(true)) => "True".to_string(),
        FieldValue::Logical(Some(false)) => "False".to_string(),
        FieldValue::Date(Some(d)) => format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()),
        FieldValue::DateTime(dt) => {
            let (date, time) = (dt.date(), dt.time());
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                date.year(),
                date.month(),
                date.day(),
                time.hours(),
                time.minutes(),
                time.seconds()
            )
        }
        FieldValue::Memo(m) => m.trim().to_string(),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => NULL_TEXT.to_string(),
    }
}

fn number_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::dbase::Record;
    use shapefile::Shape;

    #[test]
    fn test_field_value_text() {
        assert_eq!(
            field_value_text(&FieldValue::Character(Some("  A12 ".into()))),
            "A12"
        );
        assert_eq!(field_value_text(&FieldValue::Numeric(Some(12.0))), "12");
        assert_eq!(field_value_text(&FieldValue::Numeric(Some(-3.5))), "-3.5");
        assert_eq!(field_value_text(&FieldValue::Integer(7)), "7");
        assert_eq!(field_value_text(&FieldValue::Logical(Some(true))), "True");
        assert_eq!(field_value_text(&FieldValue::Numeric(None)), NULL_TEXT);
        assert_eq!(field_value_text(&FieldValue::Character(None)), NULL_TEXT);
    }

    #[test]
    fn test_attribute_text() {
        let mut record = Record::default();
        record.insert("ID".to_string(), FieldValue::Numeric(Some(42.0)));
        let feature = Feature {
            index: 4,
            shape: Shape::NullShape,
            record,
        };

        assert_eq!(feature.attribute_text("ID").unwrap(), "42");
        let err = feature.attribute_text("id").unwrap_err();
        assert!(matches!(
            err,
            ShpError::MissingField {
                feature: Some(4),
                ..
            }
        ));
    }
}
