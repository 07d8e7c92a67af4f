use tracing::warn;
use trellis_query::{OrderSpec, Sort};

use crate::catalog::FieldCatalog;
use crate::error::GridError;
use crate::resolver::Strictness;

/// Maps client sort aliases to backend fields and normalizes direction.
pub struct OrderCompiler<'a> {
    catalog: &'a dyn FieldCatalog,
    strictness: Strictness,
}

impl<'a> OrderCompiler<'a> {
    pub fn new(catalog: &'a dyn FieldCatalog, strictness: Strictness) -> Self {
        Self {
            catalog,
            strictness,
        }
    }

    /// Produce the canonical order map. Unknown aliases are dropped in
    /// lenient mode and raise a descriptive error in strict mode.
    pub fn compile(&self, sorts: &[Sort]) -> Result<OrderSpec, GridError> {
        let mut spec = OrderSpec::new();
        for sort in sorts {
            match self.catalog.full_field(&sort.field) {
                Some(field) => spec.push(field, sort.direction),
                None if self.strictness.is_strict() => {
                    return Err(GridError::UnknownField(format!(
                        "sort property '{}' has no field metadata",
                        sort.field
                    )));
                }
                None => warn!(alias = %sort.field, "unknown sort alias dropped"),
            }
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldOptions, MapCatalog};
    use trellis_query::SortDirection;

    fn catalog() -> MapCatalog {
        MapCatalog::new()
            .insert(
                "name",
                FieldOptions::new("full_name").with_direct("users.full_name"),
            )
            .with_field("age", "age")
    }

    #[test]
    fn aliases_map_to_backend_fields() {
        let catalog = catalog();
        let compiler = OrderCompiler::new(&catalog, Strictness::Lenient);
        let spec = compiler
            .compile(&[
                Sort::new("name", SortDirection::Desc),
                Sort::new("age", SortDirection::Asc),
            ])
            .unwrap();
        let fields: Vec<&str> = spec.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(fields, ["users.full_name", "age"]);
    }

    #[test]
    fn unknown_alias_dropped_in_lenient() {
        let catalog = catalog();
        let compiler = OrderCompiler::new(&catalog, Strictness::Lenient);
        let spec = compiler
            .compile(&[
                Sort::new("ghost", SortDirection::Asc),
                Sort::new("age", SortDirection::Asc),
            ])
            .unwrap();
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.first().unwrap().field, "age");
    }

    #[test]
    fn unknown_alias_errors_in_strict() {
        let catalog = catalog();
        let compiler = OrderCompiler::new(&catalog, Strictness::Strict);
        let err = compiler
            .compile(&[Sort::new("ghost", SortDirection::Asc)])
            .unwrap_err();
        assert!(matches!(err, GridError::UnknownField(_)));
    }
}
