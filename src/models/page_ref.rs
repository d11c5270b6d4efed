//! Page reference with numeric coercion

use serde::{Deserialize, Serialize};

/// A reference to a page as it appears on the wire or in user input.
///
/// Owning-page fields arrive either as numbers or as strings; two references
/// name the same page when both coerce to the same integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    Id(i64),
    Text(String),
}

impl PageRef {
    /// Numeric form of the reference, if it has one.
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Whether both references coerce to the same numeric page id.
    ///
    /// References without a numeric form never match anything.
    pub fn same_page(&self, other: &PageRef) -> bool {
        match (self.as_id(), other.as_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for PageRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for PageRef {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PageRef {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&PageRef> for PageRef {
    fn from(page: &PageRef) -> Self {
        page.clone()
    }
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

impl std::str::FromStr for PageRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Text(s.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_and_string_forms_match() {
        assert!(PageRef::Id(7).same_page(&PageRef::from("7")));
        assert!(PageRef::from(" 7 ").same_page(&PageRef::Id(7)));
        assert!(!PageRef::Id(7).same_page(&PageRef::Id(8)));
    }

    #[test]
    fn test_non_numeric_never_matches() {
        assert!(!PageRef::from("home").same_page(&PageRef::from("home")));
        assert!(!PageRef::from("").same_page(&PageRef::Id(0)));
    }

    #[test]
    fn test_deserialize_both_forms() {
        let a: PageRef = serde_json::from_str("12").unwrap();
        let b: PageRef = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(a, PageRef::Id(12));
        assert_eq!(b, PageRef::Text("12".into()));
        assert!(a.same_page(&b));
    }

    #[test]
    fn test_parse_prefers_numeric() {
        assert_eq!("42".parse::<PageRef>().unwrap(), PageRef::Id(42));
        assert_eq!("About".parse::<PageRef>().unwrap(), PageRef::Text("About".into()));
    }
}
