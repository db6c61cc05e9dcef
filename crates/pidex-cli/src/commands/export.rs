//! Output formats for extracted records.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local, Utc};

use pidex_core::{ExtractionRecord, OutputRecord, RecordField};

/// Output format of extracted records.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array
    Json,
    /// CSV, one row per record
    Csv,
    /// Plain text, one block per record
    Text,
}

/// Render records in the chosen format.
pub fn format_records(records: &[OutputRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_records_csv(&mut buffer, records)?;
            Ok(String::from_utf8(buffer)?)
        }
        OutputFormat::Text => Ok(format_text(records)),
    }
}

/// Write one CSV row per record: running number, file name, the twelve
/// fields and the extraction time.
pub fn write_records_csv<W: Write>(writer: W, records: &[OutputRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["No.", "File Name"];
    header.extend(RecordField::ALL.iter().map(|f| f.label()));
    header.push("Extracted At");
    wtr.write_record(&header)?;

    for (index, output) in records.iter().enumerate() {
        let mut row = vec![(index + 1).to_string(), output.file_name.clone()];
        row.extend(
            RecordField::ALL
                .iter()
                .map(|f| output.record.get(*f).to_string()),
        );
        row.push(format_timestamp(&output.extracted_at));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Counts over an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub files_processed: usize,
    pub records: usize,
    pub with_pi_no: usize,
    pub with_po_no: usize,
    pub with_sc_no: usize,
    pub with_beneficiary: usize,
    pub with_bank_data: usize,
}

impl ExportSummary {
    pub fn from_records(records: &[OutputRecord], files_processed: usize) -> Self {
        let count = |pred: fn(&ExtractionRecord) -> bool| {
            records.iter().filter(|output| pred(&output.record)).count()
        };

        Self {
            files_processed,
            records: records.len(),
            with_pi_no: count(|r| !r.pi_no.is_empty()),
            with_po_no: count(|r| !r.po_no.is_empty()),
            with_sc_no: count(|r| !r.sc_no.is_empty()),
            with_beneficiary: count(|r| !r.beneficiary.is_empty()),
            with_bank_data: count(|r| !r.name_of_bank.is_empty() || !r.account_no.is_empty()),
        }
    }

    /// Write the summary as a two-column CSV.
    pub fn write_csv(&self, path: &Path, exported_at: DateTime<Utc>) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record(["Field", "Value"])?;
        let rows = [
            ("Files processed", self.files_processed.to_string()),
            ("Records exported", self.records.to_string()),
            ("Export date", format_timestamp(&exported_at)),
            ("Records with P/I No.", self.with_pi_no.to_string()),
            ("Records with P/O No.", self.with_po_no.to_string()),
            ("Records with S/C No.", self.with_sc_no.to_string()),
            ("Records with beneficiary", self.with_beneficiary.to_string()),
            ("Records with bank data", self.with_bank_data.to_string()),
        ];
        for (field, value) in rows {
            wtr.write_record([field, value.as_str()])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Default export file name, stamped with the local time.
pub fn default_export_name(now: DateTime<Local>) -> String {
    format!("pidex_export_{}.csv", now.format("%Y-%m-%dT%H-%M-%S"))
}

fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_text(records: &[OutputRecord]) -> String {
    let mut output = String::new();

    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{} #{}\n", record.file_name, index + 1));
        for field in RecordField::ALL {
            let value = record.record.get(field);
            if !value.is_empty() {
                output.push_str(&format!("  {:<18} {}\n", field.label(), value));
            }
        }
    }

    output
}
