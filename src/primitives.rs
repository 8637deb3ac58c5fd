//! Mapping from FHIRPath system types to target primitive type names.
//!
//! Overrides use `System.Date=datetime.date`: the target is a qualified name;
//! it is imported under `<name>_` so it can't clash with a generated alias.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

const DEFAULT_TABLE: &[(&str, &str)] = &[
    ("System.String", "str"),
    ("System.Boolean", "bool"),
    ("System.Time", "str"),
    ("System.Date", "str"),
    ("System.DateTime", "str"),
    ("System.Decimal", "float"),
    ("System.Integer", "int"),
];

static OVERRIDE_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(System\.[A-Za-z]+)=((?:[A-Za-z_][A-Za-z0-9_]*\.)+)([A-Za-z_][A-Za-z0-9_]*)$")
        .expect("static regex")
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid primitive override `{0}`, expected `System.Type=module.path.Name`")]
    InvalidOverride(String),
}

#[derive(Debug, Clone)]
pub struct PrimitiveMap {
    table: IndexMap<String, String>,
    imports: Vec<String>,
}

impl Default for PrimitiveMap {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            imports: Vec::new(),
        }
    }
}

impl PrimitiveMap {
    pub fn with_overrides<I>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut map = Self::default();
        for raw in overrides {
            map.apply_override(raw.as_ref())?;
        }
        Ok(map)
    }

    fn apply_override(&mut self, raw: &str) -> Result<(), ConfigError> {
        let caps = OVERRIDE_RX
            .captures(raw.trim())
            .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;
        let system_type = &caps[1];
        let module = caps[2].trim_end_matches('.');
        let name = &caps[3];

        self.table.insert(system_type.to_string(), format!("{name}_"));
        let import = format!("from {module} import {name} as {name}_");
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
        Ok(())
    }

    /// Unmapped codes pass through unchanged.
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        self.table.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_system_types() {
        let map = PrimitiveMap::default();
        assert_eq!(map.resolve("System.String"), "str");
        assert_eq!(map.resolve("System.Boolean"), "bool");
        assert_eq!(map.resolve("System.Integer"), "int");
        assert_eq!(map.resolve("HumanName"), "HumanName");
        assert!(map.imports().is_empty());
    }

    #[test]
    fn override_remaps_and_imports() {
        let map = PrimitiveMap::with_overrides(["System.Date=datetime.date", "System.DateTime=datetime.datetime"])
            .unwrap();
        assert_eq!(map.resolve("System.Date"), "date_");
        assert_eq!(map.resolve("System.DateTime"), "datetime_");
        assert_eq!(map.resolve("System.Time"), "str");
        assert_eq!(
            map.imports(),
            ["from datetime import date as date_", "from datetime import datetime as datetime_"]
        );
    }

    #[test]
    fn malformed_override_is_rejected() {
        for bad in ["System.Date", "Date=datetime.date", "System.Date=date", "System.Date=datetime.1date"] {
            assert_eq!(
                PrimitiveMap::with_overrides([bad]).unwrap_err(),
                ConfigError::InvalidOverride(bad.to_string())
            );
        }
    }
}
