//! Post-field checks shared by the three collections.

use crate::error::{PulsarDbError, PulsarDbResult};
use crate::models::EntityKind;
use crate::query::{ParamValue, Params};

/// Field names a post may carry for one entity type.
pub(crate) struct FieldSet {
    pub entity: EntityKind,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl FieldSet {
    /// Reject unknown field names and report every missing required field at once.
    pub fn check(&self, fields: &Params) -> PulsarDbResult<()> {
        let unknown: Vec<&str> = fields
            .keys()
            .filter(|k| !self.required.contains(k) && !self.optional.contains(k))
            .collect();
        if !unknown.is_empty() {
            return Err(PulsarDbError::validation(format!(
                "unknown {} field(s): {}",
                self.entity,
                unknown.join(", ")
            )));
        }

        let missing: Vec<&str> = self
            .required
            .iter()
            .copied()
            .filter(|k| !fields.contains(k))
            .collect();
        if !missing.is_empty() {
            return Err(PulsarDbError::validation(format!(
                "missing required {} field(s): {}",
                self.entity,
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Non-empty text field. The caller has already checked presence.
pub(crate) fn required_text(fields: &Params, key: &str) -> PulsarDbResult<String> {
    match fields.text(key)? {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(PulsarDbError::validation(format!(
            "field '{}' must not be empty",
            key
        ))),
    }
}

/// Non-empty label that may also arrive as a number, e.g. a numeric submitter id.
pub(crate) fn required_label(fields: &Params, key: &str) -> PulsarDbResult<String> {
    match fields.get(key) {
        Some(ParamValue::Number(v)) if v.is_finite() => Ok(v.to_string()),
        Some(ParamValue::Number(_)) => Err(PulsarDbError::validation(format!(
            "field '{}' must be finite",
            key
        ))),
        _ => required_text(fields, key),
    }
}

/// Optional text field; blank counts as absent.
pub(crate) fn optional_text(fields: &Params, key: &str) -> PulsarDbResult<Option<String>> {
    Ok(fields
        .text(key)?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

pub(crate) fn required_number(fields: &Params, key: &str) -> PulsarDbResult<f64> {
    fields
        .number(key)?
        .ok_or_else(|| PulsarDbError::validation(format!("missing required field '{}'", key)))
}

/// Optional list field, blank entries dropped.
pub(crate) fn name_list(fields: &Params, key: &str) -> PulsarDbResult<Vec<String>> {
    Ok(fields
        .list(key)?
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PULSAR_FIELDS: FieldSet = FieldSet {
        entity: EntityKind::Pulsar,
        required: &["name", "ra", "dec"],
        optional: &["aliases"],
    };

    #[test]
    fn test_unknown_field() {
        let fields = Params::new()
            .with("name", "J0406+30")
            .with("ra", 61.7)
            .with("dec", 30.6)
            .with("period", 0.5);
        let err = PULSAR_FIELDS.check(&fields).unwrap_err();
        assert!(matches!(err, PulsarDbError::Validation(ref m) if m.contains("period")));
    }

    #[test]
    fn test_missing_fields_listed() {
        let fields = Params::new().with("name", "J0406+30");
        let err = PULSAR_FIELDS.check(&fields).unwrap_err();
        assert!(err.to_string().contains("ra, dec"));
    }

    #[test]
    fn test_text_helpers() {
        let fields = Params::new()
            .with("name", "  ")
            .with("backend", " PUPPI ")
            .with("aliases", ["B0403+30", ""]);
        assert!(required_text(&fields, "name").is_err());
        assert_eq!(optional_text(&fields, "backend").unwrap().as_deref(), Some("PUPPI"));
        assert_eq!(optional_text(&fields, "receiver").unwrap(), None);
        assert_eq!(name_list(&fields, "aliases").unwrap(), vec!["B0403+30".to_string()]);
    }

    #[test]
    fn test_labels_accept_numbers() {
        let fields = Params::new()
            .with("submitter", 42.0)
            .with("project", " P2780 ")
            .with("broken", f64::NAN);
        assert_eq!(required_label(&fields, "submitter").unwrap(), "42");
        assert_eq!(required_label(&fields, "project").unwrap(), "P2780");
        assert!(required_label(&fields, "broken").is_err());
        // Plain text fields still refuse numbers.
        assert!(required_text(&fields, "submitter").is_err());
    }
}
