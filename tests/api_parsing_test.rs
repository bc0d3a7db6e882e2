use pretty_assertions::assert_eq;

use sanctions_watch::api::eu::{self, parse_export};
use sanctions_watch::api::ofac::{self, parse_sdn_list};
use sanctions_watch::api::types::{NOT_AVAILABLE, UNNAMED_ENTITY};
use sanctions_watch::api::DatasetKind;
use sanctions_watch::error::SanctionsError;

#[test]
fn test_dataset_routes_and_files() {
    assert_eq!(DatasetKind::Ofac.route_prefix(), "/api/sanctions");
    assert_eq!(DatasetKind::Eu.route_prefix(), "/api/eu-sanctions");
    assert_eq!(DatasetKind::Ofac.cache_file_name(), "ofac-cache.json");
    assert_eq!(DatasetKind::Eu.cache_file_name(), "eu-cache.json");
}

mod ofac_parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_and_repeated_lists_have_same_shape() {
        let xml = r#"<sdnList>
            <sdnEntry>
                <uid>1</uid><lastName>ONE</lastName><sdnType>Entity</sdnType>
                <programList><program>SDGT</program></programList>
                <citizenshipList><citizenship><uid>9</uid><country>Iran</country></citizenship></citizenshipList>
            </sdnEntry>
            <sdnEntry>
                <uid>2</uid><lastName>TWO</lastName><sdnType>Entity</sdnType>
                <programList><program>SDGT</program><program>IRGC</program><program>IFSR</program></programList>
                <citizenshipList>
                    <citizenship><country>Iran</country></citizenship>
                    <citizenship><country>Iraq</country></citizenship>
                </citizenshipList>
            </sdnEntry>
        </sdnList>"#;

        let records = parse_sdn_list(xml).unwrap();
        assert_eq!(records[0].attribute(ofac::PROGRAMS), "SDGT");
        assert_eq!(records[0].attribute(ofac::COUNTRIES), "Iran");
        assert_eq!(records[1].attribute(ofac::PROGRAMS), "SDGT, IRGC, IFSR");
        assert_eq!(records[1].attribute(ofac::COUNTRIES), "Iran, Iraq");
    }

    #[test]
    fn test_missing_lists_are_not_available() {
        let xml = r#"<sdnList><sdnEntry><uid>3</uid><firstName>Ana</firstName><lastName>LOPEZ</lastName><sdnType>Individual</sdnType></sdnEntry></sdnList>"#;

        let records = parse_sdn_list(xml).unwrap();
        let record = &records[0];
        assert_eq!(record.name, "Ana LOPEZ");
        for key in [
            ofac::PROGRAMS,
            ofac::COUNTRIES,
            ofac::ADDRESSES,
            ofac::REMARKS,
            ofac::DATE_OF_BIRTH,
        ] {
            assert_eq!(record.attribute(key), NOT_AVAILABLE, "{}", key);
        }
    }

    #[test]
    fn test_addresses_and_dates_of_birth() {
        let xml = r#"<sdnList><sdnEntry>
            <uid>4</uid><lastName>SHIPPING CO</lastName><sdnType>Entity</sdnType>
            <remarks>Linked To: OTHER CO.</remarks>
            <addressList>
                <address><address1>1 Harbour Rd</address1><city>Limassol</city><country>Cyprus</country></address>
                <address><country>Malta</country></address>
            </addressList>
            <dateOfBirthList>
                <dateOfBirthItem><dateOfBirth>1970</dateOfBirth></dateOfBirthItem>
                <dateOfBirthItem><dateOfBirth>1971</dateOfBirth></dateOfBirthItem>
            </dateOfBirthList>
        </sdnEntry></sdnList>"#;

        let record = &parse_sdn_list(xml).unwrap()[0];
        assert_eq!(
            record.attribute(ofac::ADDRESSES),
            "1 Harbour Rd Limassol Cyprus; Malta"
        );
        assert_eq!(record.attribute(ofac::DATE_OF_BIRTH), "1970, 1971");
        assert_eq!(record.attribute(ofac::REMARKS), "Linked To: OTHER CO.");
    }

    #[test]
    fn test_vessel_without_names_uses_type() {
        let xml = r#"<sdnList><sdnEntry><uid>5</uid><sdnType>Vessel</sdnType></sdnEntry></sdnList>"#;
        let record = &parse_sdn_list(xml).unwrap()[0];
        assert_eq!(record.name, "Vessel");
        assert_eq!(record.record_type, "Vessel");
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = parse_sdn_list("<export><sanctionEntity/></export>").unwrap_err();
        assert!(matches!(err, SanctionsError::Parse(_)));
    }
}

mod eu_parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_whole_name_wins() {
        let xml = r#"<export><sanctionEntity logicalId="1">
            <nameAlias firstName="Ivan" lastName="Petrov" wholeName="Ivan Ivanovich Petrov"/>
        </sanctionEntity></export>"#;
        let record = &parse_export(xml).unwrap()[0];
        assert_eq!(record.name, "Ivan Ivanovich Petrov");
        assert_eq!(record.attribute(eu::FIRST_NAME), "Ivan");
        assert_eq!(record.attribute(eu::LAST_NAME), "Petrov");
    }

    #[test]
    fn test_only_first_alias_counts() {
        let xml = r#"<export><sanctionEntity logicalId="2">
            <nameAlias lastName="Primary"/>
            <nameAlias wholeName="Secondary Alias"/>
        </sanctionEntity></export>"#;
        let record = &parse_export(xml).unwrap()[0];
        assert_eq!(record.name, "Primary");
        assert_eq!(record.attribute(eu::WHOLE_NAME), NOT_AVAILABLE);
    }

    #[test]
    fn test_entity_without_alias_is_unnamed() {
        let xml = r#"<export><sanctionEntity logicalId="3"><subjectType code="enterprise"/></sanctionEntity></export>"#;
        let record = &parse_export(xml).unwrap()[0];
        assert_eq!(record.name, UNNAMED_ENTITY);
        assert_eq!(record.record_type, "enterprise");
    }

    #[test]
    fn test_alias_remark_is_not_entity_remark() {
        let xml = r#"<export><sanctionEntity logicalId="4">
            <nameAlias wholeName="X"><remark>alias note</remark></nameAlias>
            <remark>entity note</remark>
        </sanctionEntity></export>"#;
        let record = &parse_export(xml).unwrap()[0];
        assert_eq!(record.attribute(eu::REMARK), "entity note");
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(parse_export("<export/>").unwrap().len(), 0);
    }
}
