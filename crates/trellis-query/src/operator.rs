use serde::{Deserialize, Serialize};

/// Filter operator as supplied by the client.
///
/// Wire names follow the grid protocol: comparison operators use their
/// short mnemonic (`lt`, `gt`), the relative-date bucket operator is `dr`,
/// and the audit composites are `lu` (by user) and `ld` (by date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    #[serde(alias = "=", alias = "==")]
    Eq,
    Like,
    In,
    Lt,
    Gt,
    #[serde(rename = "dr")]
    DateRange,
    #[serde(rename = "lu")]
    AuditUser,
    #[serde(rename = "ld")]
    AuditDate,
    Where,
}

impl FilterOp {
    /// Parse a wire name, accepting the `=`/`==` aliases for equality.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" | "=" | "==" => Some(Self::Eq),
            "like" => Some(Self::Like),
            "in" => Some(Self::In),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "dr" => Some(Self::DateRange),
            "lu" => Some(Self::AuditUser),
            "ld" => Some(Self::AuditDate),
            "where" => Some(Self::Where),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Like => "like",
            Self::In => "in",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::DateRange => "dr",
            Self::AuditUser => "lu",
            Self::AuditDate => "ld",
            Self::Where => "where",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        assert_eq!(FilterOp::parse("eq"), Some(FilterOp::Eq));
        assert_eq!(FilterOp::parse("="), Some(FilterOp::Eq));
        assert_eq!(FilterOp::parse("=="), Some(FilterOp::Eq));
        assert_eq!(FilterOp::parse("dr"), Some(FilterOp::DateRange));
        assert_eq!(FilterOp::parse("lu"), Some(FilterOp::AuditUser));
        assert_eq!(FilterOp::parse("ld"), Some(FilterOp::AuditDate));
        assert_eq!(FilterOp::parse("between"), None);
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&FilterOp::DateRange).unwrap();
        assert_eq!(json, "\"dr\"");
        let op: FilterOp = serde_json::from_str("\"=\"").unwrap();
        assert_eq!(op, FilterOp::Eq);
    }

    #[test]
    fn as_str_matches_parse() {
        for op in [
            FilterOp::Eq,
            FilterOp::Like,
            FilterOp::In,
            FilterOp::Lt,
            FilterOp::Gt,
            FilterOp::DateRange,
            FilterOp::AuditUser,
            FilterOp::AuditDate,
            FilterOp::Where,
        ] {
            assert_eq!(FilterOp::parse(op.as_str()), Some(op));
        }
    }
}
