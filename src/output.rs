use std::io::Write;

use clap::ValueEnum;
use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use crate::record::{Record, Zone, AUTO_TTL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

const CSV_HEADER: [&str; 7] = ["ID", "Type", "Name", "Content", "TTL", "Priority", "Proxied"];
const PROXIED_MARK: &str = "✓";

pub fn write_records(
    out: &mut impl Write,
    records: &[Record],
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Table => write_table(out, records),
        OutputFormat::Json => write_json(out, records),
        OutputFormat::Csv => write_csv(out, records),
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(headers.to_vec());
    table
}

pub fn write_table(out: &mut impl Write, records: &[Record]) -> std::io::Result<()> {
    let mut table = new_table(&["TYPE", "NAME", "CONTENT", "TTL", "PRIORITY", "PROXIED"]);
    for record in records {
        let ttl = if record.ttl == AUTO_TTL {
            "auto".to_string()
        } else {
            record.ttl.to_string()
        };
        let priority = record
            .priority
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let proxied = if record.is_proxied() { PROXIED_MARK } else { "" };
        table.add_row(vec![
            record.record_type.to_string(),
            record.name.clone(),
            record.content.clone(),
            ttl,
            priority,
            proxied.to_string(),
        ]);
    }
    writeln!(out, "{table}")
}

pub fn write_zones(out: &mut impl Write, zones: &[Zone]) -> std::io::Result<()> {
    let mut table = new_table(&["NAME", "STATUS", "ID"]);
    for zone in zones {
        table.add_row(vec![&zone.name, &zone.status, &zone.id]);
    }
    writeln!(out, "{table}")
}

pub fn write_json(out: &mut impl Write, records: &[Record]) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)
}

pub fn write_csv(out: &mut impl Write, records: &[Record]) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        let ttl = record.ttl.to_string();
        let priority = record.priority.map(|p| p.to_string()).unwrap_or_default();
        let proxied = record.is_proxied().to_string();
        writer.write_record([
            record.id.as_str(),
            record.record_type.as_str(),
            record.name.as_str(),
            record.content.as_str(),
            ttl.as_str(),
            priority.as_str(),
            proxied.as_str(),
        ])?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;

    fn records() -> Vec<Record> {
        vec![
            Record {
                id: "r1".to_string(),
                record_type: RecordType::A,
                name: "www.example.com".to_string(),
                content: "1.1.1.1".to_string(),
                ttl: 1,
                priority: None,
                proxied: Some(true),
            },
            Record {
                id: "r2".to_string(),
                record_type: RecordType::MX,
                name: "example.com".to_string(),
                content: "mail.example.com".to_string(),
                ttl: 300,
                priority: Some(10),
                proxied: None,
            },
            Record {
                id: "r3".to_string(),
                record_type: RecordType::TXT,
                name: "example.com".to_string(),
                content: "\"v=spf1 a, mx -all\"".to_string(),
                ttl: 3600,
                priority: None,
                proxied: Some(false),
            },
        ]
    }

    fn render(format: OutputFormat, records: &[Record]) -> String {
        let mut out = Vec::new();
        write_records(&mut out, records, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_table_output() {
        let output = render(OutputFormat::Table, &records()[..2]);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[1],
            "| TYPE | NAME            | CONTENT          | TTL  | PRIORITY | PROXIED |"
        );
        assert_eq!(
            lines[3],
            "| A    | www.example.com | 1.1.1.1          | auto | -        | ✓       |"
        );
        assert_eq!(
            lines[4],
            "| MX   | example.com     | mail.example.com | 300  | 10       |         |"
        );
        assert!(lines[0].starts_with("+------+"));
        assert!(output.ends_with("+\n"));
    }

    #[test]
    fn test_table_output_without_records_has_header_only() {
        let output = render(OutputFormat::Table, &[]);
        assert!(output.contains("| TYPE | NAME | CONTENT | TTL | PRIORITY | PROXIED |"));
        assert!(!output.contains("auto"));
    }

    #[test]
    fn test_csv_output() {
        let output = render(OutputFormat::Csv, &records());
        let expected = "\
ID,Type,Name,Content,TTL,Priority,Proxied
r1,A,www.example.com,1.1.1.1,1,,true
r2,MX,example.com,mail.example.com,300,10,false
r3,TXT,example.com,\"\"\"v=spf1 a, mx -all\"\"\",3600,,false
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_json_output() {
        let output = render(OutputFormat::Json, &records()[1..2]);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "ID": "r2",
                "Type": "MX",
                "Name": "example.com",
                "Content": "mail.example.com",
                "TTL": 300,
                "Priority": 10,
                "Proxied": null,
            }])
        );
        assert!(output.contains("\n  {"));
        assert_eq!(render(OutputFormat::Json, &[]).trim(), "[]");
    }

    #[test]
    fn test_zones_table() {
        let zones = vec![Zone {
            id: "zone-1".to_string(),
            name: "example.com".to_string(),
            status: "active".to_string(),
        }];
        let mut out = Vec::new();
        write_zones(&mut out, &zones).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("| example.com | active | zone-1 |"));
    }
}
