//! Held page restoration
//!
//! Drains the hold collection in batches of `per_page`, repairs every pending
//! page, submits the batch to the fetch queue and flips the drain markers.

use crate::flow::{pending_filter, LoginFlow, FETCHED_FIELD, HELD_PAGE_FIELD, RESTORED};
use crate::page::Page;
use crate::storage::{FetchQueue, OutputRecord};
use crate::{LoginFlowError, Result};
use serde::de::Error as _;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Summary of one drain of the hold collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Number of queries issued against the output store
    pub queries: u32,

    /// Number of batches that restored at least one page
    pub batches: u32,

    /// Number of pages submitted for fetching
    pub restored: u64,
}

impl LoginFlow {
    /// Restores every held page still marked as pending
    ///
    /// Each batch is repaired in memory, then submitted and marked restored
    /// together. Records marked by this drain leave the pending set, so the
    /// same page index is queried again; if the store still reports only
    /// records this drain already restored, the index moves forward.
    ///
    /// A failure aborts the current batch. Pages of a batch whose markers were
    /// not written are restored again by the next drain.
    pub fn restore_held_pages(&mut self, queue: &mut dyn FetchQueue) -> Result<DrainReport> {
        let filter = pending_filter();
        let per_page = self.options.per_page;
        let collection = self.options.collection.clone();

        let mut report = DrainReport::default();
        let mut restored_ids: HashSet<String> = HashSet::new();
        let mut page_index = 1;

        tracing::info!("Restoring held pages from '{}'", collection);

        loop {
            let held = self
                .outputs
                .find_outputs(&collection, &filter, page_index, per_page)?;
            report.queries += 1;

            if held.first().is_none() {
                break;
            }

            if held.iter().all(|record| restored_ids.contains(&record.id)) {
                page_index += 1;
                continue;
            }

            let mut pages = Vec::with_capacity(held.len());
            let mut outputs = Vec::with_capacity(held.len());
            for mut record in held {
                if restored_ids.contains(&record.id) {
                    continue;
                }

                let mut page = decode_held_page(&record)?;
                self.repair_page(&mut page)?;
                pages.push(page);

                record.set(FETCHED_FIELD, json!(RESTORED));
                outputs.push(record);
            }

            queue.enqueue(&pages)?;
            self.outputs.save(&outputs)?;
            restored_ids.extend(outputs.into_iter().map(|record| record.id));

            report.batches += 1;
            report.restored += pages.len() as u64;
            tracing::debug!(
                "Restored batch {} ({} pages) from '{}'",
                report.batches,
                pages.len(),
                collection
            );
        }

        tracing::info!(
            "Restored {} held pages in {} batches",
            report.restored,
            report.batches
        );

        Ok(report)
    }
}

/// Reads the parked page from a held record
///
/// The page is either stored as a JSON object or as serialized JSON text.
fn decode_held_page(record: &OutputRecord) -> Result<Page> {
    let decode_error = |source: serde_json::Error| LoginFlowError::Decode {
        id: record.id.clone(),
        source,
    };

    match record.get(HELD_PAGE_FIELD) {
        Some(Value::Object(fields)) => Ok(Page::from(fields.clone())),
        Some(Value::String(text)) => serde_json::from_str(text).map_err(decode_error),
        Some(other) => Err(decode_error(serde_json::Error::custom(format!(
            "expected a page object or JSON text, got {}",
            other
        )))),
        None => Err(decode_error(serde_json::Error::custom(
            "held record has no page",
        ))),
    }
}
