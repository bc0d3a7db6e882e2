use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, SanctionsError};

/// Local name of the document's root element
pub fn root_element_name(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => {
                return Err(SanctionsError::Parse(
                    "document has no root element".to_string(),
                ))
            }
            Ok(_) => {}
            Err(e) => {
                return Err(SanctionsError::Parse(format!(
                    "malformed XML at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }
}

/// Fail unless the root element is `expected`
pub fn expect_root(xml: &str, expected: &str) -> Result<()> {
    let root = root_element_name(xml)?;
    if root == expected {
        Ok(())
    } else {
        Err(SanctionsError::Parse(format!(
            "expected root element <{}>, found <{}>",
            expected, root
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_after_declaration() {
        let xml = r#"<?xml version="1.0" standalone="yes"?>
<!-- generated -->
<sdnList xmlns="http://tempuri.org/sdnList.xsd"><sdnEntry/></sdnList>"#;
        assert_eq!(root_element_name(xml).unwrap(), "sdnList");
        assert!(expect_root(xml, "sdnList").is_ok());
    }

    #[test]
    fn test_wrong_root() {
        let err = expect_root("<html><body/></html>", "export").unwrap_err();
        assert!(err.to_string().contains("<export>"));
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(
            root_element_name("   "),
            Err(SanctionsError::Parse(_))
        ));
    }
}
