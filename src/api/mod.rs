pub mod client;
pub mod eu;
pub mod http_client;
pub mod ofac;
pub mod types;
pub mod xml;

pub use client::{ClientConfig, SanctionsSource, SourceFactory};
pub use types::{SanctionRecord, SearchField};

/// Sanctions datasets served by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DatasetKind {
    /// US Treasury OFAC Specially Designated Nationals list
    Ofac,
    /// EU consolidated financial sanctions list
    Eu,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Ofac, DatasetKind::Eu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ofac => "ofac",
            Self::Eu => "eu",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ofac => "OFAC Specially Designated Nationals",
            Self::Eu => "EU Consolidated Financial Sanctions",
        }
    }

    /// File name of the persisted snapshot
    pub fn cache_file_name(&self) -> &'static str {
        match self {
            Self::Ofac => "ofac-cache.json",
            Self::Eu => "eu-cache.json",
        }
    }

    /// Mount point of the dataset's HTTP routes
    pub fn route_prefix(&self) -> &'static str {
        match self {
            Self::Ofac => "/api/sanctions",
            Self::Eu => "/api/eu-sanctions",
        }
    }

    /// Fields matched by substring search, in evaluation order
    pub fn search_fields(&self) -> &'static [SearchField] {
        match self {
            Self::Ofac => &[
                SearchField::Name,
                SearchField::Id,
                SearchField::Attribute(ofac::COUNTRIES),
                SearchField::Attribute(ofac::PROGRAMS),
            ],
            Self::Eu => &[
                SearchField::Name,
                SearchField::RecordType,
                SearchField::Attribute(eu::PROGRAMME),
                SearchField::Attribute(eu::REGULATION_TITLE),
            ],
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values() {
        use clap::ValueEnum;
        assert_eq!(DatasetKind::from_str("OFAC", true), Ok(DatasetKind::Ofac));
        assert_eq!(DatasetKind::from_str("eu", false), Ok(DatasetKind::Eu));
        assert!(DatasetKind::from_str("un", true).is_err());
    }

    #[test]
    fn test_route_prefixes_are_distinct() {
        assert_ne!(
            DatasetKind::Ofac.route_prefix(),
            DatasetKind::Eu.route_prefix()
        );
        assert_ne!(
            DatasetKind::Ofac.cache_file_name(),
            DatasetKind::Eu.cache_file_name()
        );
    }
}
