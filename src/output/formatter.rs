use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::collections::BTreeSet;

use super::RefreshSummary;
use crate::api::{eu, ofac, DatasetKind, SanctionRecord};
use crate::cli::OutputFormat;
use crate::error::{Result, SanctionsError};

/// Attribute columns shown in table output, per dataset
fn detail_columns(kind: DatasetKind) -> [(&'static str, &'static str); 2] {
    match kind {
        DatasetKind::Ofac => [("Programs", ofac::PROGRAMS), ("Countries", ofac::COUNTRIES)],
        DatasetKind::Eu => [("Programme", eu::PROGRAMME), ("Regulation", eu::REGULATION_TITLE)],
    }
}

pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format search results of one dataset; `total` is the size of the whole dataset
    pub fn format_records(
        &self,
        kind: DatasetKind,
        records: &[SanctionRecord],
        total: usize,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_records_table(kind, records, total)),
            OutputFormat::Json => self.format_records_json(records, total),
            OutputFormat::Csv => self.format_records_csv(records),
        }
    }

    /// Format the outcome of `fetch`
    pub fn format_refresh_summary(&self, rows: &[RefreshSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_summary_table(rows)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(rows).map_err(SanctionsError::Serialization)
            }
            OutputFormat::Csv => self.format_summary_csv(rows),
        }
    }

    fn format_records_table(
        &self,
        kind: DatasetKind,
        records: &[SanctionRecord],
        total: usize,
    ) -> String {
        let columns = detail_columns(kind);
        let mut table = Table::new();

        let mut header = vec![
            Cell::new("#").fg(Color::Cyan),
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Type").fg(Color::Cyan),
        ];
        header.extend(columns.iter().map(|(title, _)| Cell::new(title).fg(Color::Cyan)));
        table.set_header(header);

        for (idx, record) in records.iter().enumerate() {
            let mut row = vec![
                Cell::new((idx + 1).to_string()),
                Cell::new(&record.id),
                Cell::new(truncate_string(&record.name, 40)),
                Cell::new(&record.record_type),
            ];
            row.extend(
                columns
                    .iter()
                    .map(|(_, key)| Cell::new(truncate_string(record.attribute(key), 30))),
            );
            table.add_row(row);
        }

        table.set_content_arrangement(ContentArrangement::Dynamic);

        let mut result = format!(
            "\n{} {} | Total: {} | Results: {}\n\n",
            "📊".cyan(),
            kind.display_name().bold(),
            total.to_string().yellow(),
            records.len().to_string().yellow()
        );
        result.push_str(&table.to_string());
        result
    }

    fn format_records_json(&self, records: &[SanctionRecord], total: usize) -> Result<String> {
        let body = serde_json::json!({
            "data": records,
            "count": records.len(),
            "total": total,
        });
        serde_json::to_string_pretty(&body).map_err(SanctionsError::Serialization)
    }

    fn format_records_csv(&self, records: &[SanctionRecord]) -> Result<String> {
        // Attribute columns are the union of keys, in key order
        let keys: BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.attributes.keys().map(String::as_str))
            .collect();

        let mut wtr = csv::Writer::from_writer(vec![]);

        let mut header = vec!["id", "name", "type"];
        header.extend(keys.iter().copied());
        wtr.write_record(&header)?;

        for record in records {
            let mut row = vec![
                record.id.as_str(),
                record.name.as_str(),
                record.record_type.as_str(),
            ];
            row.extend(keys.iter().map(|key| record.attribute(key)));
            wtr.write_record(&row)?;
        }

        into_string(wtr)
    }

    fn format_summary_table(&self, rows: &[RefreshSummary]) -> String {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("Dataset").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Records").fg(Color::Cyan),
            Cell::new("Last updated").fg(Color::Cyan),
            Cell::new("Saved to").fg(Color::Cyan),
        ]);

        for row in rows {
            let status = match &row.error {
                None => Cell::new("ok").fg(Color::Green),
                Some(error) => Cell::new(truncate_string(error, 50)).fg(Color::Red),
            };
            table.add_row(vec![
                Cell::new(row.dataset),
                status,
                Cell::new(row.count.map_or_else(|| "-".to_string(), |c| c.to_string())),
                Cell::new(format_timestamp(row.last_updated)),
                Cell::new(row.saved_to.as_deref().unwrap_or("-")),
            ]);
        }

        table.set_content_arrangement(ContentArrangement::Dynamic);

        let failed = rows.iter().filter(|row| row.error.is_some()).count();
        let mut result = format!(
            "\n{} Refreshed: {} | Failed: {}\n\n",
            "🔄".cyan(),
            (rows.len() - failed).to_string().green(),
            if failed > 0 {
                failed.to_string().red()
            } else {
                failed.to_string().normal()
            }
        );
        result.push_str(&table.to_string());
        result
    }

    fn format_summary_csv(&self, rows: &[RefreshSummary]) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(["dataset", "status", "count", "last_updated", "saved_to"])?;

        for row in rows {
            let count = row.count.map(|c| c.to_string()).unwrap_or_default();
            let last_updated = row.last_updated.map(|t| t.to_rfc3339()).unwrap_or_default();
            wtr.write_record([
                row.dataset,
                row.error.as_deref().unwrap_or("ok"),
                count.as_str(),
                last_updated.as_str(),
                row.saved_to.as_deref().unwrap_or(""),
            ])?;
        }

        into_string(wtr)
    }
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| SanctionsError::Other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SanctionsError::Other(e.to_string()))
}

fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "-".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

// Helper functions
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn record(id: &str, name: &str, attributes: &[(&str, &str)]) -> SanctionRecord {
        SanctionRecord {
            id: id.to_string(),
            name: name.to_string(),
            record_type: "Individual".to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("ŠARŪNAS ŽEMAITIS", 10), "ŠARŪNAS...");
    }

    #[test]
    fn test_records_csv_uses_attribute_union() {
        let records = vec![
            record("1", "JOHN DOE", &[(ofac::PROGRAMS, "CUBA")]),
            record("2", "JANE ROE", &[(ofac::COUNTRIES, "Iran")]),
        ];

        let csv = Formatter::new(OutputFormat::Csv)
            .format_records(DatasetKind::Ofac, &records, 2)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "id,name,type,countries,programs");
        assert_eq!(lines[1], "1,JOHN DOE,Individual,N/A,CUBA");
        assert_eq!(lines[2], "2,JANE ROE,Individual,Iran,N/A");
    }

    #[test]
    fn test_records_json_carries_total() {
        let records = vec![record("1", "JOHN DOE", &[])];
        let json = Formatter::new(OutputFormat::Json)
            .format_records(DatasetKind::Ofac, &records, 7)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["total"], 7);
        assert_eq!(value["data"][0]["name"], "JOHN DOE");
    }

    #[test]
    fn test_records_table_shows_dataset_columns() {
        let records = vec![record(
            "EU.1.2",
            "Ivan Petrov",
            &[(eu::PROGRAMME, "RUS"), (eu::REGULATION_TITLE, "2014/269")],
        )];
        let table = Formatter::new(OutputFormat::Table)
            .format_records(DatasetKind::Eu, &records, 1)
            .unwrap();

        assert!(table.contains("Programme"));
        assert!(table.contains("RUS"));
        assert!(table.contains("Ivan Petrov"));
    }

    #[test]
    fn test_refresh_summary_csv() {
        let rows = vec![
            RefreshSummary {
                dataset: "ofac",
                count: Some(3),
                last_updated: None,
                saved_to: Some("/tmp/ofac-cache.json".to_string()),
                error: None,
            },
            RefreshSummary {
                dataset: "eu",
                count: None,
                last_updated: None,
                saved_to: None,
                error: Some("HTTP error".to_string()),
            },
        ];

        let csv = Formatter::new(OutputFormat::Csv)
            .format_refresh_summary(&rows)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[1], "ofac,ok,3,,/tmp/ofac-cache.json");
        assert_eq!(lines[2], "eu,HTTP error,,,");
    }
}
