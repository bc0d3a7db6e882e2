use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::client::{ClientConfig, SanctionsSource};
use super::http_client::HttpFetcher;
use super::types::{join_or_not_available, or_not_available, SanctionRecord, NOT_AVAILABLE};
use super::xml::expect_root;
use super::DatasetKind;
use crate::error::{Result, SanctionsError};

pub const PROGRAMS: &str = "programs";
pub const COUNTRIES: &str = "countries";
pub const ADDRESSES: &str = "addresses";
pub const REMARKS: &str = "remarks";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";

const ROOT_ELEMENT: &str = "sdnList";

#[derive(Debug, Deserialize)]
struct SdnList {
    #[serde(rename = "sdnEntry", default)]
    entries: Vec<SdnEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdnEntry {
    uid: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    sdn_type: Option<String>,
    remarks: Option<String>,
    program_list: Option<ProgramList>,
    citizenship_list: Option<CitizenshipList>,
    address_list: Option<AddressList>,
    date_of_birth_list: Option<DateOfBirthList>,
}

#[derive(Debug, Deserialize)]
struct ProgramList {
    #[serde(rename = "program", default)]
    programs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CitizenshipList {
    #[serde(rename = "citizenship", default)]
    items: Vec<Citizenship>,
}

#[derive(Debug, Deserialize)]
struct Citizenship {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressList {
    #[serde(rename = "address", default)]
    items: Vec<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    address1: Option<String>,
    city: Option<String>,
    country: Option<String>,
}

impl Address {
    /// `"address1 city country"`, trimmed
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.address1.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct DateOfBirthList {
    #[serde(rename = "dateOfBirthItem", default)]
    items: Vec<DateOfBirthItem>,
}

#[derive(Debug, Deserialize)]
struct DateOfBirthItem {
    #[serde(rename = "dateOfBirth")]
    date_of_birth: Option<String>,
}

impl SdnEntry {
    fn into_record(self) -> SanctionRecord {
        let record_type = or_not_available(self.sdn_type.as_deref());

        let full_name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = match full_name.trim() {
            "" => record_type.clone(),
            trimmed => trimmed.to_string(),
        };

        let programs = self
            .program_list
            .map(|list| join_or_not_available(list.programs, ", "))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let countries = self
            .citizenship_list
            .map(|list| {
                join_or_not_available(list.items.into_iter().filter_map(|c| c.country), ", ")
            })
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let addresses = self
            .address_list
            .map(|list| join_or_not_available(list.items.iter().map(Address::render), "; "))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let date_of_birth = self
            .date_of_birth_list
            .map(|list| {
                join_or_not_available(
                    list.items.into_iter().filter_map(|d| d.date_of_birth),
                    ", ",
                )
            })
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let mut attributes = BTreeMap::new();
        attributes.insert(PROGRAMS.to_string(), programs);
        attributes.insert(COUNTRIES.to_string(), countries);
        attributes.insert(ADDRESSES.to_string(), addresses);
        attributes.insert(REMARKS.to_string(), or_not_available(self.remarks.as_deref()));
        attributes.insert(DATE_OF_BIRTH.to_string(), date_of_birth);

        SanctionRecord {
            id: self.uid.map(|uid| uid.trim().to_string()).unwrap_or_default(),
            name,
            record_type,
            attributes,
        }
    }
}

/// Parse an SDN XML document into normalized records.
///
/// The document is rooted at `<sdnList>` with one `<sdnEntry>` per
/// sanctioned party. Every list-valued field is deserialized as a sequence,
/// so an entry with one program and an entry with three produce the same
/// joined shape.
pub fn parse_sdn_list(xml: &str) -> Result<Vec<SanctionRecord>> {
    expect_root(xml, ROOT_ELEMENT)?;

    let list: SdnList = quick_xml::de::from_str(xml)
        .map_err(|e| SanctionsError::Parse(format!("invalid SDN document: {}", e)))?;

    Ok(list.entries.into_iter().map(SdnEntry::into_record).collect())
}

/// OFAC SDN source
pub struct OfacSource {
    fetcher: HttpFetcher,
}

impl OfacSource {
    pub fn new(url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::new(url, config)?,
        })
    }
}

#[async_trait]
impl SanctionsSource for OfacSource {
    async fn fetch_records(&self) -> Result<Vec<SanctionRecord>> {
        info!("Fetching latest OFAC data from {}", self.fetcher.url());
        let body = self.fetcher.fetch_bytes().await?;
        let xml = String::from_utf8(body)
            .map_err(|e| SanctionsError::Decode(format!("SDN list is not valid UTF-8: {}", e)))?;

        let records = tokio::task::spawn_blocking(move || parse_sdn_list(&xml))
            .await
            .map_err(|e| SanctionsError::Other(format!("SDN parse task failed: {}", e)))??;
        debug!("Parsed {} SDN entries", records.len());

        Ok(records)
    }

    fn dataset(&self) -> DatasetKind {
        DatasetKind::Ofac
    }

    fn url(&self) -> &str {
        self.fetcher.url()
    }
}
