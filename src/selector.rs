use crate::config::LENGTH_EPS;
use crate::types::Batch;

/// First batch, in stock order, with at least `required` meters left.
pub fn select_batch(batches: &[Batch], required: f64) -> Option<&Batch> {
    batches.iter().find(|b| b.length + LENGTH_EPS >= required)
}
