use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC", alias = "asc", alias = "Asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc", alias = "Desc")]
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse of a client direction string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(alias = "property")]
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Insertion-ordered map from backend field name to direction.
///
/// Pushing a field that is already present updates its direction in place,
/// keeping the original position, so the map behaves like an ordered
/// dictionary rather than a plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    sorts: Vec<Sort>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        let field = field.into();
        match self.sorts.iter_mut().find(|s| s.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.sorts.push(Sort { field, direction }),
        }
    }

    /// First (field, direction) pair in insertion order.
    pub fn first(&self) -> Option<&Sort> {
        self.sorts.first()
    }

    /// "The" sort: the first pair, or the supplied default when empty.
    pub fn one_order(&self, default: Sort) -> Sort {
        self.first().cloned().unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sorts.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sort> {
        self.sorts.iter()
    }
}

impl FromIterator<Sort> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = Sort>>(iter: I) -> Self {
        let mut spec = Self::new();
        for sort in iter {
            spec.push(sort.field, sort.direction);
        }
        spec
    }
}

impl<'a> IntoIterator for &'a OrderSpec {
    type Item = &'a Sort;
    type IntoIter = std::slice::Iter<'a, Sort>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorts.iter()
    }
}
