//! Field access helpers shared by the section validators.

use serde_yaml::{Mapping, Value};

use crate::error::ValidationError;

use super::parser::RawManifest;

/// A top-level manifest section known to be a mapping.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    name: &'static str,
    map: &'a Mapping,
}

impl<'a> Section<'a> {
    /// Looks up a top-level section.
    ///
    /// # Errors
    ///
    /// Returns `MissingSection` if the key is absent and `InvalidSection`
    /// if its value is not a mapping.
    pub fn of(manifest: &'a RawManifest, name: &'static str) -> Result<Self, ValidationError> {
        match manifest.section(name) {
            None => Err(ValidationError::missing_section(name)),
            Some(Value::Mapping(map)) => Ok(Self { name, map }),
            Some(_) => Err(ValidationError::InvalidSection {
                section: name.to_string(),
            }),
        }
    }

    /// Returns the section name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the raw value of a field, including an explicit null.
    #[must_use]
    pub fn raw(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field)
    }

    /// Returns the value of a field, treating null as absent.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Returns the value of a required field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the field is absent or null, and
    /// `EmptyValue` if it is a blank string.
    pub fn require(&self, field: &str) -> Result<&'a Value, ValidationError> {
        let value = self.get(field).ok_or_else(|| ValidationError::MissingField {
            section: self.name.to_string(),
            field: field.to_string(),
        })?;

        if let Value::String(s) = value
            && s.trim().is_empty()
        {
            return Err(ValidationError::EmptyValue {
                section: self.name.to_string(),
                field: field.to_string(),
            });
        }

        Ok(value)
    }

    /// Requires a non-empty string field.
    ///
    /// # Errors
    ///
    /// Fails like [`Section::require`], or with `TypeMismatch` if the value
    /// is not a string.
    pub fn require_str(&self, field: &str) -> Result<&'a str, ValidationError> {
        self.require(field)?
            .as_str()
            .ok_or_else(|| ValidationError::type_mismatch(self.name, field, "str"))
    }

    /// Reads an optional string field.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the field is present, non-null, and not a
    /// string.
    pub fn optional_str(&self, field: &str) -> Result<Option<&'a str>, ValidationError> {
        self.get(field)
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| ValidationError::type_mismatch(self.name, field, "str"))
            })
            .transpose()
    }

    /// Requires an integer field within `min..=max`.
    ///
    /// # Errors
    ///
    /// Fails like [`Section::require`], with `TypeMismatch` for non-integers
    /// and `OutOfRange` for integers outside the bounds.
    pub fn require_int(&self, field: &str, min: i128, max: i128) -> Result<i128, ValidationError> {
        let value = self.require(field)?;
        self.int_in_range(field, value, min, max)
    }

    /// Reads an optional integer field within `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` or `OutOfRange` if a present value is invalid.
    pub fn optional_int(
        &self,
        field: &str,
        min: i128,
        max: i128,
    ) -> Result<Option<i128>, ValidationError> {
        self.get(field)
            .map(|v| self.int_in_range(field, v, min, max))
            .transpose()
    }

    fn int_in_range(
        &self,
        field: &str,
        value: &Value,
        min: i128,
        max: i128,
    ) -> Result<i128, ValidationError> {
        let n = as_integer(value)
            .ok_or_else(|| ValidationError::type_mismatch(self.name, field, "int"))?;
        if n < min || n > max {
            return Err(ValidationError::out_of_range(self.name, field, n.to_string()));
        }
        Ok(n)
    }
}

/// Returns the value as an integer. Booleans and floats are not integers.
#[must_use]
pub fn as_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        _ => None,
    }
}

/// Returns a short name for the kind of a YAML value.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Renders a scalar value the way it appears in a manifest.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map_or_else(|_| String::from("<unprintable>"), |s| s.trim_end().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::ManifestLoader;

    fn manifest(yaml: &str) -> RawManifest {
        ManifestLoader::new().parse_yaml(yaml, None).unwrap()
    }

    #[test]
    fn test_section_lookup() {
        let m = manifest("api:\n  address: host\nmodel: 3\nservice: ~\n");
        assert!(Section::of(&m, "api").is_ok());
        assert_eq!(
            Section::of(&m, "resources").unwrap_err(),
            ValidationError::missing_section("resources")
        );
        assert_eq!(
            Section::of(&m, "model").unwrap_err(),
            ValidationError::InvalidSection { section: String::from("model") }
        );
        assert_eq!(
            Section::of(&m, "service").unwrap_err(),
            ValidationError::InvalidSection { section: String::from("service") }
        );
    }

    #[test]
    fn test_require_rejects_missing_null_and_blank() {
        let m = manifest("api:\n  address: \"   \"\n  port: ~\n");
        let api = Section::of(&m, "api").unwrap();

        assert!(matches!(api.require("address"), Err(ValidationError::EmptyValue { .. })));
        assert!(matches!(api.require("port"), Err(ValidationError::MissingField { .. })));
        assert!(matches!(api.require("other"), Err(ValidationError::MissingField { .. })));
    }

    #[test]
    fn test_require_keeps_falsy_non_strings() {
        let m = manifest("envs:\n  FLAG: false\n  COUNT: 0\n");
        let envs = Section::of(&m, "envs").unwrap();

        assert_eq!(envs.require("FLAG").unwrap(), &Value::Bool(false));
        assert_eq!(as_integer(envs.require("COUNT").unwrap()), Some(0));
    }

    #[test]
    fn test_integer_fields() {
        let m = manifest("resources:\n  cpus: 8\n  memory: \"64\"\n  ports: 0\n  ratio: 1.5\n");
        let res = Section::of(&m, "resources").unwrap();

        assert_eq!(res.require_int("cpus", 1, 1024).unwrap(), 8);
        assert!(matches!(
            res.require_int("memory", 1, 1024),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            res.require_int("ports", 1, 65535),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            res.require_int("ratio", 1, 10),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert_eq!(res.optional_int("absent", 1, 10).unwrap(), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&Value::Bool(true)), "bool");
        assert_eq!(type_name(&serde_yaml::from_str::<Value>("1.5").unwrap()), "float");
        assert_eq!(type_name(&serde_yaml::from_str::<Value>("7").unwrap()), "int");
        assert_eq!(type_name(&serde_yaml::from_str::<Value>("[1]").unwrap()), "sequence");
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(&serde_yaml::from_str::<Value>("8000").unwrap()), "8000");
        assert_eq!(render(&Value::String(String::from("8000"))), "8000");
        assert_eq!(render(&Value::Null), "null");
    }
}
