use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Backend type of a field, as declared by the metadata registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    DateTime,
    Bool,
}

/// Metadata for one client-facing property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Backend column the property maps to.
    pub field: String,
    /// Fully-qualified column for direct SQL references, when it differs
    /// from `field` (e.g. `users.full_name`).
    #[serde(default)]
    pub direct: Option<String>,
    #[serde(default)]
    pub filter_type: Option<FieldType>,
    #[serde(default)]
    pub label: Option<String>,
}

impl FieldOptions {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direct: None,
            filter_type: None,
            label: None,
        }
    }

    pub fn with_direct(mut self, direct: impl Into<String>) -> Self {
        self.direct = Some(direct.into());
        self
    }

    pub fn with_type(mut self, filter_type: FieldType) -> Self {
        self.filter_type = Some(filter_type);
        self
    }

    /// Column name to use in predicates: the direct reference when
    /// declared, the plain field otherwise.
    pub fn target(&self) -> &str {
        self.direct.as_deref().unwrap_or(&self.field)
    }
}

/// Field-metadata registry, supplied by the external data manager.
pub trait FieldCatalog {
    fn field_options(&self, property: &str) -> Option<FieldOptions>;

    /// Backend field for a client alias, used by the order compiler.
    fn full_field(&self, alias: &str) -> Option<String>;
}

/// HashMap-backed catalog for tests and config-driven models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapCatalog {
    fields: HashMap<String, FieldOptions>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, property: impl Into<String>, options: FieldOptions) -> Self {
        self.fields.insert(property.into(), options);
        self
    }

    /// Shorthand for a plain text column mapped 1:1.
    pub fn with_field(self, property: &str, field: &str) -> Self {
        self.insert(property, FieldOptions::new(field))
    }
}

impl FieldCatalog for MapCatalog {
    fn field_options(&self, property: &str) -> Option<FieldOptions> {
        self.fields.get(property).cloned()
    }

    fn full_field(&self, alias: &str) -> Option<String> {
        self.fields.get(alias).map(|o| o.target().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_field_prefers_direct_reference() {
        let catalog = MapCatalog::new()
            .insert(
                "name",
                FieldOptions::new("full_name").with_direct("users.full_name"),
            )
            .with_field("age", "age");
        assert_eq!(catalog.full_field("name").as_deref(), Some("users.full_name"));
        assert_eq!(catalog.full_field("age").as_deref(), Some("age"));
        assert_eq!(catalog.full_field("ghost"), None);
    }
}
