//! Field listings for configuration structs, generated by `#[derive(ConfigSchema)]`.

use super::error::CalcError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A single configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

pub trait ConfigSchema {
    fn config_fields() -> &'static [ConfigField];
}

/// A top-level configuration file.
pub trait ConfigDocument: ConfigSchema + DeserializeOwned {
    /// Check the raw document before deserializing it.
    fn check_document(value: &Value) -> Result<(), CalcError> {
        check_required::<Self>(value, None)
    }
}

/// Check that every required key of `T` is present and non-null in `value`.
///
/// `section` prefixes reported names, so a missing `savings_rate` inside the
/// `misc` object is reported as `misc.savings_rate`.
pub fn check_required<T: ConfigSchema>(value: &Value, section: Option<&str>) -> Result<(), CalcError> {
    let qualify = |name: &str| match section {
        Some(section) => format!("{section}.{name}"),
        None => name.to_string(),
    };

    let object = value
        .as_object()
        .ok_or_else(|| CalcError::invalid(section.unwrap_or("config"), "expected a JSON object"))?;

    for field in T::config_fields().iter().filter(|f| f.required) {
        match object.get(field.name) {
            None | Some(Value::Null) => return Err(CalcError::MissingField(qualify(field.name))),
            Some(_) => {}
        }
    }
    Ok(())
}

/// Fetch a nested section, reporting it as missing if absent.
pub fn section<'a>(value: &'a Value, name: &str) -> Result<&'a Value, CalcError> {
    match value.get(name) {
        None | Some(Value::Null) => Err(CalcError::MissingField(name.to_string())),
        Some(section) => Ok(section),
    }
}

/// Take an override if given, otherwise the configured value.
pub fn resolve<T: Copy>(name: &str, override_value: Option<T>, configured: Option<T>) -> Result<T, CalcError> {
    override_value
        .or(configured)
        .ok_or_else(|| CalcError::MissingField(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Sample;

    impl ConfigSchema for Sample {
        fn config_fields() -> &'static [ConfigField] {
            static FIELDS: &[ConfigField] = &[
                ConfigField {
                    name: "needed",
                    required: true,
                    description: "",
                },
                ConfigField {
                    name: "extra",
                    required: false,
                    description: "",
                },
            ];
            FIELDS
        }
    }

    #[test]
    fn present_fields_pass() {
        assert_eq!(check_required::<Sample>(&json!({ "needed": 1 }), None), Ok(()));
    }

    #[test]
    fn missing_field_is_named() {
        let err = check_required::<Sample>(&json!({ "extra": 1 }), None).unwrap_err();
        assert_eq!(err, CalcError::MissingField("needed".to_string()));
    }

    #[test]
    fn null_counts_as_missing_and_is_qualified() {
        let err = check_required::<Sample>(&json!({ "needed": null }), Some("misc")).unwrap_err();
        assert_eq!(err, CalcError::MissingField("misc.needed".to_string()));
    }

    #[test]
    fn non_object_rejected() {
        let err = check_required::<Sample>(&json!([1, 2]), Some("income")).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "income"));
    }

    #[test]
    fn override_wins_over_config() {
        assert_eq!(resolve("x", Some(2), Some(1)), Ok(2));
        assert_eq!(resolve("x", None, Some(1)), Ok(1));
        assert_eq!(
            resolve::<i32>("x", None, None),
            Err(CalcError::MissingField("x".to_string()))
        );
    }
}
