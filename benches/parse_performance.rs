use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sanctions_watch::api::eu::{decode_windows_1257, parse_export};
use sanctions_watch::api::ofac::parse_sdn_list;
use sanctions_watch::api::DatasetKind;
use sanctions_watch::query::search_records;

const SIZES: &[usize] = &[100, 1_000, 10_000];

/// Synthetic SDN document with `entries` entries
fn sdn_document(entries: usize) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" standalone="yes"?><sdnList>"#);
    for i in 0..entries {
        xml.push_str(&format!(
            "<sdnEntry><uid>{i}</uid><firstName>First{i}</firstName><lastName>LAST {i}</lastName>\
             <sdnType>Individual</sdnType>\
             <programList><program>SDGT</program><program>PROGRAM-{p}</program></programList>\
             <citizenshipList><citizenship><uid>{i}</uid><country>Country {p}</country></citizenship></citizenshipList>\
             <addressList><address><address1>{i} Main St</address1><city>City</city><country>Country {p}</country></address></addressList>\
             <dateOfBirthList><dateOfBirthItem><dateOfBirth>01 Jan 1970</dateOfBirth></dateOfBirthItem></dateOfBirthList>\
             </sdnEntry>",
            i = i,
            p = i % 40
        ));
    }
    xml.push_str("</sdnList>");
    xml
}

/// Synthetic EU export, windows-1257 encoded
fn eu_document(entities: usize) -> Vec<u8> {
    let mut bytes = b"<?xml version=\"1.0\" encoding=\"windows-1257\"?><export>".to_vec();
    for i in 0..entities {
        bytes.extend_from_slice(
            format!(
                "<sanctionEntity logicalId=\"{i}\" euReferenceNumber=\"EU.{i}.1\">\
                 <remark>Entity remark {i}</remark>\
                 <regulation numberTitle=\"2014/{p}\" programme=\"PRG{p}\" regulationType=\"amendment\">\
                 <publicationUrl>https://eur-lex.europa.eu/{i}</publicationUrl></regulation>\
                 <subjectType code=\"person\"/><nameAlias firstName=\"",
                i = i,
                p = i % 40
            )
            .as_bytes(),
        );
        // "Šarūnas"
        bytes.extend_from_slice(b"\xD0ar\xFBnas\" lastName=\"Name\" strong=\"true\"/></sanctionEntity>");
    }
    bytes.extend_from_slice(b"</export>");
    bytes
}

fn bench_ofac_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("ofac_parse");
    for &size in SIZES {
        let xml = sdn_document(size);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &xml, |b, xml| {
            b.iter(|| parse_sdn_list(black_box(xml)).unwrap())
        });
    }
    group.finish();
}

fn bench_eu_decode_and_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("eu_decode_and_parse");
    for &size in SIZES {
        let bytes = eu_document(size);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| {
                let xml = decode_windows_1257(black_box(bytes)).unwrap();
                parse_export(&xml).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let records = parse_sdn_list(&sdn_document(10_000)).unwrap();
    let fields = DatasetKind::Ofac.search_fields();

    let mut group = c.benchmark_group("search");
    for query in ["last 9999", "program-7", "no such entity"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, query| {
            b.iter(|| search_records(black_box(&records), query, 100, fields))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ofac_parse,
    bench_eu_decode_and_parse,
    bench_search
);
criterion_main!(benches);
