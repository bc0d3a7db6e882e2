use async_trait::async_trait;
use encoding_rs::WINDOWS_1257;
use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

use super::client::{ClientConfig, SanctionsSource};
use super::http_client::HttpFetcher;
use super::types::{or_not_available, SanctionRecord, UNNAMED_ENTITY};
use super::DatasetKind;
use crate::error::{Result, SanctionsError};

pub const REFERENCE_NUMBER: &str = "referenceNumber";
pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const WHOLE_NAME: &str = "wholeName";
pub const GENDER: &str = "gender";
pub const STRONG: &str = "strong";
pub const REMARK: &str = "remark";
pub const REGULATION_TITLE: &str = "regulationTitle";
pub const REGULATION_TYPE: &str = "regulationType";
pub const PUBLICATION_DATE: &str = "publicationDate";
pub const PROGRAMME: &str = "programme";
pub const PUBLICATION_URL: &str = "publicationUrl";

const ROOT_ELEMENT: &[u8] = b"export";

/// Decode the raw download from Windows-1257
pub fn decode_windows_1257(bytes: &[u8]) -> Result<String> {
    WINDOWS_1257
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            SanctionsError::Decode("invalid windows-1257 byte sequence in EU list".to_string())
        })
}

/// Display name: whole name, else "first last", else `"Unnamed Entity"`.
/// Every part is NFKC-normalized.
pub fn display_name(whole: Option<&str>, first: Option<&str>, last: Option<&str>) -> String {
    if let Some(whole) = whole.filter(|w| !w.trim().is_empty()) {
        return whole.nfkc().collect();
    }

    let first: String = first.unwrap_or("").nfkc().collect();
    let last: String = last.unwrap_or("").nfkc().collect();
    let composed = format!("{} {}", first, last);
    match composed.trim() {
        "" => UNNAMED_ENTITY.to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[derive(Debug, Default)]
struct AliasDraft {
    first_name: Option<String>,
    last_name: Option<String>,
    whole_name: Option<String>,
    gender: Option<String>,
    strong: Option<String>,
}

#[derive(Debug, Default)]
struct RegulationDraft {
    number_title: Option<String>,
    regulation_type: Option<String>,
    publication_date: Option<String>,
    programme: Option<String>,
    publication_url: Option<String>,
}

#[derive(Debug, Default)]
struct EntityDraft {
    logical_id: Option<String>,
    reference_number: Option<String>,
    alias: Option<AliasDraft>,
    subject_type: Option<String>,
    remark: Option<String>,
    regulation: Option<RegulationDraft>,
}

impl EntityDraft {
    fn into_record(self) -> SanctionRecord {
        let alias = self.alias.unwrap_or_default();
        let regulation = self.regulation.unwrap_or_default();

        let name = display_name(
            alias.whole_name.as_deref(),
            alias.first_name.as_deref(),
            alias.last_name.as_deref(),
        );

        let mut attributes = BTreeMap::new();
        for (key, value) in [
            (REFERENCE_NUMBER, self.reference_number.as_deref()),
            (FIRST_NAME, alias.first_name.as_deref()),
            (LAST_NAME, alias.last_name.as_deref()),
            (WHOLE_NAME, alias.whole_name.as_deref()),
            (GENDER, alias.gender.as_deref()),
            (STRONG, alias.strong.as_deref()),
            (REMARK, self.remark.as_deref()),
            (REGULATION_TITLE, regulation.number_title.as_deref()),
            (REGULATION_TYPE, regulation.regulation_type.as_deref()),
            (PUBLICATION_DATE, regulation.publication_date.as_deref()),
            (PROGRAMME, regulation.programme.as_deref()),
            (PUBLICATION_URL, regulation.publication_url.as_deref()),
        ] {
            attributes.insert(key.to_string(), or_not_available(value));
        }

        SanctionRecord {
            id: self.logical_id.unwrap_or_default(),
            name,
            record_type: or_not_available(self.subject_type.as_deref()),
            attributes,
        }
    }
}

/// Text content being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    Remark,
    PublicationUrl,
}

/// Raw (unescaped) value of a non-empty attribute
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| SanctionsError::Parse(format!("invalid attribute: {}", e)))?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = String::from_utf8_lossy(&attr.value).trim().to_string();
            return Ok((!value.is_empty()).then_some(value));
        }
    }
    Ok(None)
}

/// Streaming state for one `<export>` document
#[derive(Debug)]
struct ExportParser {
    records: Vec<SanctionRecord>,
    current: Option<EntityDraft>,
    root_seen: bool,
    depth: usize,
    entity_depth: usize,
    in_first_regulation: bool,
    capture: Capture,
    text: String,
}

impl ExportParser {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            current: None,
            root_seen: false,
            depth: 0,
            entity_depth: 0,
            in_first_regulation: false,
            capture: Capture::Nothing,
            text: String::new(),
        }
    }

    fn open(&mut self, element: &BytesStart<'_>, self_closing: bool) -> Result<()> {
        let local = element.local_name();
        let name = local.as_ref();

        if !self.root_seen {
            if name != ROOT_ELEMENT {
                return Err(SanctionsError::Parse(format!(
                    "expected root element <export>, found <{}>",
                    String::from_utf8_lossy(name)
                )));
            }
            self.root_seen = true;
            return Ok(());
        }

        if name == b"sanctionEntity" {
            self.current = Some(EntityDraft {
                logical_id: attribute(element, "logicalId")?,
                reference_number: attribute(element, "euReferenceNumber")?,
                ..EntityDraft::default()
            });
            self.entity_depth = self.depth;
            if self_closing {
                self.close_entity();
            }
            return Ok(());
        }

        let child_of_entity = self.depth == self.entity_depth + 1;
        let Some(entity) = self.current.as_mut() else {
            return Ok(());
        };

        match name {
            b"nameAlias" if entity.alias.is_none() => {
                entity.alias = Some(AliasDraft {
                    first_name: attribute(element, "firstName")?,
                    last_name: attribute(element, "lastName")?,
                    whole_name: attribute(element, "wholeName")?,
                    gender: attribute(element, "gender")?,
                    strong: attribute(element, "strong")?,
                });
            }
            b"subjectType" if entity.subject_type.is_none() => {
                entity.subject_type = attribute(element, "code")?;
            }
            b"regulation" if entity.regulation.is_none() => {
                entity.regulation = Some(RegulationDraft {
                    number_title: attribute(element, "numberTitle")?,
                    regulation_type: attribute(element, "regulationType")?,
                    publication_date: attribute(element, "publicationDate")?,
                    programme: attribute(element, "programme")?,
                    publication_url: None,
                });
                self.in_first_regulation = !self_closing;
            }
            b"publicationUrl" if self.in_first_regulation && !self_closing => {
                self.capture = Capture::PublicationUrl;
                self.text.clear();
            }
            b"remark" if child_of_entity && entity.remark.is_none() && !self_closing => {
                self.capture = Capture::Remark;
                self.text.clear();
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"sanctionEntity" => self.close_entity(),
            b"regulation" => self.in_first_regulation = false,
            b"remark" if self.capture == Capture::Remark => {
                if let Some(entity) = self.current.as_mut() {
                    entity.remark = Some(self.text.trim().to_string());
                }
                self.capture = Capture::Nothing;
            }
            b"publicationUrl" if self.capture == Capture::PublicationUrl => {
                if let Some(regulation) = self
                    .current
                    .as_mut()
                    .and_then(|entity| entity.regulation.as_mut())
                {
                    regulation.publication_url = Some(self.text.trim().to_string());
                }
                self.capture = Capture::Nothing;
            }
            _ => {}
        }
    }

    fn close_entity(&mut self) {
        if let Some(entity) = self.current.take() {
            self.records.push(entity.into_record());
        }
        self.in_first_regulation = false;
        self.capture = Capture::Nothing;
    }

    fn text(&mut self, raw: &[u8]) -> Result<()> {
        if self.capture == Capture::Nothing {
            return Ok(());
        }
        let text = std::str::from_utf8(raw)
            .map_err(|e| SanctionsError::Parse(format!("invalid text content: {}", e)))?;
        self.text.push_str(text);
        Ok(())
    }
}

/// Parse a decoded EU export document into normalized records.
///
/// Uses a pull reader over `<export>`; attribute and text values are taken
/// raw, without entity expansion. Only the first `<nameAlias>` and the first
/// `<regulation>` of each entity are kept.
pub fn parse_export(xml: &str) -> Result<Vec<SanctionRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = ExportParser::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                parser.open(&e, false)?;
                parser.depth += 1;
            }
            Ok(Event::Empty(e)) => parser.open(&e, true)?,
            Ok(Event::End(e)) => {
                parser.depth = parser.depth.saturating_sub(1);
                parser.close(e.local_name().as_ref());
            }
            Ok(Event::Text(t)) => parser.text(&t)?,
            Ok(Event::CData(c)) => parser.text(&c)?,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SanctionsError::Parse(format!(
                    "malformed EU list at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    if !parser.root_seen {
        return Err(SanctionsError::Parse(
            "document has no root element".to_string(),
        ));
    }

    Ok(parser.records)
}

/// EU consolidated financial sanctions list source. The document is served
/// as Windows-1257 bytes and is decoded before parsing.
pub struct EuSource {
    fetcher: HttpFetcher,
}

impl EuSource {
    pub fn new(url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Ok(Self {
            fetcher: HttpFetcher::new(url, config)?,
        })
    }
}

#[async_trait]
impl SanctionsSource for EuSource {
    async fn fetch_records(&self) -> Result<Vec<SanctionRecord>> {
        info!("Fetching latest EU sanctions data from {}", self.fetcher.url());
        let body = self.fetcher.fetch_bytes().await?;

        let records = tokio::task::spawn_blocking(move || {
            let xml = decode_windows_1257(&body)?;
            parse_export(&xml)
        })
        .await
        .map_err(|e| SanctionsError::Other(format!("EU parse task failed: {}", e)))??;
        debug!("Parsed {} EU sanction entities", records.len());

        Ok(records)
    }

    fn dataset(&self) -> DatasetKind {
        DatasetKind::Eu
    }

    fn url(&self) -> &str {
        self.fetcher.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::NOT_AVAILABLE;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="windows-1257"?>
<export generationDate="2026-10-17T18:30:12.000+02:00" globalFileId="171234">
  <sanctionEntity designationDetails="" unitedNationId="QDi.001" euReferenceNumber="EU.27.28" logicalId="13">
    <remark>UNSC RE ASSET FREEZE &amp; TRAVEL BAN</remark>
    <regulation regulationType="amendment" organisationType="commission" publicationDate="2002-05-30" entryIntoForceDate="2002-05-31" numberTitle="881/2002 (OJ L139)" programme="TAQA" logicalId="2">
      <publicationUrl>http://eur-lex.europa.eu/LexUriServ/LexUriServ.do?uri=OJ:L:2002:139:0009:0022:EN:PDF</publicationUrl>
    </regulation>
    <regulation regulationType="amendment" numberTitle="2016/1686" programme="ISIL" logicalId="3"/>
    <subjectType code="person" classificationCode="P"/>
    <nameAlias firstName="Saddam" middleName="" lastName="Hussein Al-Tikriti" wholeName="" function="" gender="M" title="" nameLanguage="" strong="true" regulationLanguage="en" logicalId="17">
      <regulationSummary regulationType="amendment" publicationDate="2003-07-08" numberTitle="1210/2003" publicationUrl=""/>
      <remark>alias level remark</remark>
    </nameAlias>
    <nameAlias wholeName="Abu Ali" strong="false" logicalId="18"/>
  </sanctionEntity>
  <sanctionEntity euReferenceNumber="EU.99.1" logicalId="99">
    <subjectType code="enterprise" classificationCode="E"/>
    <nameAlias wholeName="Ｆｕｌｌ Width Trading" strong="true" logicalId="100"/>
  </sanctionEntity>
  <sanctionEntity logicalId="100"/>
</export>"#;

    #[test]
    fn test_parse_sample() {
        let records = parse_export(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);

        let person = &records[0];
        assert_eq!(person.id, "13");
        assert_eq!(person.name, "Saddam Hussein Al-Tikriti");
        assert_eq!(person.record_type, "person");
        assert_eq!(person.attribute(REFERENCE_NUMBER), "EU.27.28");
        assert_eq!(person.attribute(GENDER), "M");
        assert_eq!(person.attribute(STRONG), "true");
        assert_eq!(person.attribute(WHOLE_NAME), NOT_AVAILABLE);
        assert_eq!(person.attribute(REMARK), "UNSC RE ASSET FREEZE &amp; TRAVEL BAN");
        assert_eq!(person.attribute(REGULATION_TITLE), "881/2002 (OJ L139)");
        assert_eq!(person.attribute(REGULATION_TYPE), "amendment");
        assert_eq!(person.attribute(PUBLICATION_DATE), "2002-05-30");
        assert_eq!(person.attribute(PROGRAMME), "TAQA");
        assert_eq!(
            person.attribute(PUBLICATION_URL),
            "http://eur-lex.europa.eu/LexUriServ/LexUriServ.do?uri=OJ:L:2002:139:0009:0022:EN:PDF"
        );
    }

    #[test]
    fn test_whole_name_is_nfkc_normalized() {
        let records = parse_export(SAMPLE).unwrap();
        assert_eq!(records[1].name, "Full Width Trading");
        assert_eq!(records[1].record_type, "enterprise");
        assert_eq!(records[1].attribute(REMARK), NOT_AVAILABLE);
        assert_eq!(records[1].attribute(PROGRAMME), NOT_AVAILABLE);
    }

    #[test]
    fn test_self_closing_entity_defaults() {
        let records = parse_export(SAMPLE).unwrap();
        let empty = &records[2];
        assert_eq!(empty.id, "100");
        assert_eq!(empty.name, UNNAMED_ENTITY);
        assert_eq!(empty.record_type, NOT_AVAILABLE);
        assert!(empty.attributes.values().all(|v| v == NOT_AVAILABLE));
    }

    #[test]
    fn test_display_name_rules() {
        assert_eq!(display_name(Some("Full Name"), Some("A"), Some("B")), "Full Name");
        assert_eq!(display_name(None, Some("John"), Some("Smith")), "John Smith");
        assert_eq!(display_name(Some(""), None, Some("Smith")), "Smith");
        assert_eq!(display_name(None, None, None), UNNAMED_ENTITY);
        // decomposed "é" composes to the same string as the precomposed form
        assert_eq!(
            display_name(None, Some("Jose\u{0301}"), None),
            display_name(None, Some("Jos\u{00e9}"), None)
        );
    }

    #[test]
    fn test_decode_windows_1257() {
        // "Šarūnas Žalgiris" in windows-1257
        let bytes = b"\xD0ar\xFBnas \xDEalgiris";
        assert_eq!(decode_windows_1257(bytes).unwrap(), "Šarūnas Žalgiris");
    }

    #[test]
    fn test_decode_rejects_unmapped_byte() {
        let err = decode_windows_1257(b"abc\xA1").unwrap_err();
        assert!(matches!(err, SanctionsError::Decode(_)));
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_export("<sdnList><sdnEntry/></sdnList>").unwrap_err();
        assert!(matches!(err, SanctionsError::Parse(_)));
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_export("<export><sanctionEntity logicalId=\"1\"></export>").unwrap_err();
        assert!(matches!(err, SanctionsError::Parse(_)));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_export("").is_err());
    }
}
