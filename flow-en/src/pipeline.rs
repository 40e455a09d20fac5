//! Collection enrichment pipeline
//!
//! Items are enriched one at a time, in input order, so remote rate limits
//! hold across the whole collection. Within an item, the sequencer's steps
//! run in dependency order.

use flow_common::config::FailurePolicy;
use flow_sq::{EnrichmentError, EnrichmentStep, Item, ItemEnricher, Sequencer};
use tracing::{info, warn};

/// A tolerated enrichment failure
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub index: usize,
    pub item_id: String,
    pub step: EnrichmentStep,
    pub error: EnrichmentError,
}

/// Outcome of [`enrich_collection`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentSummary {
    /// Items visited
    pub items: usize,
    /// Steps that failed and were marked empty
    pub failures: Vec<StepFailure>,
}

impl EnrichmentSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Enrich every item for `sequencer`
///
/// After each item, `progress` receives its index and the sequencer's
/// description of what was found for it.
///
/// # Errors
/// With [`FailurePolicy::Abort`], the first step failure is returned and
/// later items are left untouched. With [`FailurePolicy::Empty`], the
/// failed attribute is marked empty, the item's remaining steps still run,
/// and the failure is recorded in the summary.
pub async fn enrich_collection<F>(
    sequencer: &Sequencer,
    enricher: &dyn ItemEnricher,
    items: &mut [Item],
    policy: FailurePolicy,
    mut progress: F,
) -> Result<EnrichmentSummary, EnrichmentError>
where
    F: FnMut(usize, String),
{
    let mut summary = EnrichmentSummary::default();

    for (index, item) in items.iter_mut().enumerate() {
        for &step in sequencer.enrichment_steps() {
            let Err(error) = step.run(enricher, item).await else {
                continue;
            };

            match policy {
                FailurePolicy::Abort => {
                    warn!(item_id = %item.id, step = step.name(), error = %error, "Enrichment failed, aborting");
                    return Err(error);
                }
                FailurePolicy::Empty => {
                    warn!(item_id = %item.id, step = step.name(), error = %error, "Enrichment failed, treating as empty");
                    step.mark_empty(item);
                    summary.failures.push(StepFailure {
                        index,
                        item_id: item.id.clone(),
                        step,
                        error,
                    });
                }
            }
        }

        summary.items += 1;
        progress(index, sequencer.describe_enriched(item));
    }

    info!(
        strategy = %sequencer.kind(),
        items = summary.items,
        failures = summary.failures.len(),
        "Collection enriched"
    );

    Ok(summary)
}
