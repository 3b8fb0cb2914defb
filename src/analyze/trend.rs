use std::collections::BTreeMap;

use ndarray::Array2;

use crate::analyze::document_topics;
use crate::error::{Result, TopicError};

/// Topic counts per period.
///
/// `periods[j]` is the period label of document `j` (e.g. `"2011"` or
/// `"2011-04"`); documents without one are skipped. Periods come out in
/// lexicographic order, which is chronological for ISO labels.
pub fn topic_counts_by_period(
    topic_document: &Array2<f64>,
    periods: &[Option<String>],
) -> Result<BTreeMap<String, Vec<usize>>> {
    if periods.len() != topic_document.ncols() {
        return Err(TopicError::InvalidInput(format!(
            "{} period labels for {} documents",
            periods.len(),
            topic_document.ncols()
        )));
    }
    let n_topics = topic_document.nrows();
    let mut by_period: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (topic, period) in document_topics(topic_document).into_iter().zip(periods) {
        if let Some(period) = period {
            by_period.entry(period.clone()).or_insert_with(|| vec![0; n_topics])[topic] += 1;
        }
    }
    Ok(by_period)
}
