use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for any field the source omitted
pub const NOT_AVAILABLE: &str = "N/A";

/// Display name used when a record carries no usable name parts
pub const UNNAMED_ENTITY: &str = "Unnamed Entity";

/// One sanctioned entity, flattened out of its source schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanctionRecord {
    /// Source-native identifier (empty if the source omitted it)
    pub id: String,
    /// Derived display name, never empty
    pub name: String,
    /// Classification code from the source
    pub record_type: String,
    /// Source-specific fields
    pub attributes: BTreeMap<String, String>,
}

impl SanctionRecord {
    /// Attribute value, or `"N/A"` when the key is not present
    pub fn attribute(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .map(String::as_str)
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// Record field that participates in substring search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Id,
    RecordType,
    Attribute(&'static str),
}

impl SearchField {
    pub fn value<'a>(&self, record: &'a SanctionRecord) -> &'a str {
        match self {
            Self::Name => &record.name,
            Self::Id => &record.id,
            Self::RecordType => &record.record_type,
            Self::Attribute(key) => record.attribute(key),
        }
    }
}

/// Trimmed value, or `"N/A"` when absent or blank
pub fn or_not_available(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Join the non-blank values with `separator`, or `"N/A"` if none remain
pub fn join_or_not_available<I, S>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if parts.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        parts.join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_not_available() {
        assert_eq!(or_not_available(Some("  Iran ")), "Iran");
        assert_eq!(or_not_available(Some("   ")), NOT_AVAILABLE);
        assert_eq!(or_not_available(None), NOT_AVAILABLE);
    }

    #[test]
    fn test_join_single_and_multiple() {
        assert_eq!(join_or_not_available(["SDGT"], ", "), "SDGT");
        assert_eq!(
            join_or_not_available(["SDGT", "IRGC", "IFSR"], ", "),
            "SDGT, IRGC, IFSR"
        );
        assert_eq!(join_or_not_available(Vec::<String>::new(), ", "), NOT_AVAILABLE);
        assert_eq!(join_or_not_available(["", " "], "; "), NOT_AVAILABLE);
    }

    #[test]
    fn test_missing_attribute_is_not_available() {
        let record = SanctionRecord {
            id: "1".to_string(),
            name: "Test".to_string(),
            record_type: "Entity".to_string(),
            attributes: BTreeMap::new(),
        };
        assert_eq!(record.attribute("programs"), NOT_AVAILABLE);
        assert_eq!(SearchField::Attribute("programs").value(&record), NOT_AVAILABLE);
    }
}
