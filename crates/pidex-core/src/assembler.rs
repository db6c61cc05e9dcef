//! Turning extracted records into output records.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::models::record::{ExtractionRecord, OutputRecord};

/// Sequence shared by every assembler in the process.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stamps records with an id, their file name and the extraction time.
///
/// Field values are copied verbatim; nothing is validated or normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAssembler;

impl RecordAssembler {
    pub fn new() -> Self {
        Self
    }

    /// One output record per extracted record, in input order.
    pub fn assemble(&self, records: Vec<ExtractionRecord>, file_name: &str) -> Vec<OutputRecord> {
        let extracted_at = Utc::now();

        records
            .into_iter()
            .map(|record| OutputRecord {
                id: next_id(extracted_at.timestamp_millis()),
                file_name: file_name.to_string(),
                record,
                extracted_at,
            })
            .collect()
    }
}

/// Millisecond timestamp plus a process-wide sequence number.
fn next_id(millis: i64) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{millis}-{seq}")
}
