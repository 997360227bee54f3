//! Reference data for a fresh database.

use crate::error::ValidationErrors;
use crate::validation::{validate_ingredient, validate_tag, IngredientDraft, TagDraft, WriteMode};
use serde::Deserialize;

pub struct SeedTag {
    pub name: &'static str,
    pub color: &'static str,
    pub slug: &'static str,
}

pub const DEFAULT_TAGS: &[SeedTag] = &[
    SeedTag {
        name: "Breakfast",
        color: "#E26C2D",
        slug: "breakfast",
    },
    SeedTag {
        name: "Lunch",
        color: "#008000",
        slug: "dinner",
    },
    SeedTag {
        name: "Dinner",
        color: "#7366BD",
        slug: "supper",
    },
];

impl SeedTag {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_tag(
            &TagDraft {
                name: Some(self.name),
                color: Some(self.color),
                slug: Some(self.slug),
            },
            WriteMode::Create,
        )
    }
}

/// One ingredient from an import file, either a CSV row
/// `name,measurement_unit` or a JSON object with the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

impl IngredientRecord {
    /// Trims both fields and validates them like an API create.
    pub fn normalized(self) -> Result<Self, ValidationErrors> {
        let record = Self {
            name: self.name.trim().to_string(),
            measurement_unit: self.measurement_unit.trim().to_string(),
        };
        validate_ingredient(
            &IngredientDraft {
                name: Some(&record.name),
                measurement_unit: Some(&record.measurement_unit),
            },
            WriteMode::Create,
        )?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tags_are_valid() {
        for tag in DEFAULT_TAGS {
            assert!(tag.validate().is_ok(), "{}", tag.slug);
        }
    }

    #[test]
    fn test_record_normalized() {
        let record = IngredientRecord {
            name: "  flour ".into(),
            measurement_unit: "g\n".into(),
        }
        .normalized()
        .unwrap();
        assert_eq!(record.name, "flour");
        assert_eq!(record.measurement_unit, "g");
    }

    #[test]
    fn test_record_blank_unit_rejected() {
        let result = IngredientRecord {
            name: "salt".into(),
            measurement_unit: " ".into(),
        }
        .normalized();
        assert!(result.is_err());
    }

    #[test]
    fn test_record_from_json() {
        let records: Vec<IngredientRecord> =
            serde_json::from_str(r#"[{"name": "abricot", "measurement_unit": "g"}]"#).unwrap();
        assert_eq!(records[0].name, "abricot");
    }
}
