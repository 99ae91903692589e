use crate::predicate::Predicate;
use impresso_filters_core::metrics;
use impresso_filters_core::{Filter, FilterType};
use tracing::{debug, trace};

pub const WIKIDATA_COLUMN: &str = "wikidata_id";

/// Predicate for the `wikidataId` filters in `filters`, or `None` when there
/// are none so the caller can leave the clause out.
pub fn build_relational_exact_match_condition(filters: &[Filter]) -> Option<Predicate> {
    exact_match_condition_for(filters, &FilterType::WikidataId, WIKIDATA_COLUMN)
}

/// Each filter of `filter_type` with a value becomes `column IN (...)`, or
/// `NOT IN` when excluded; several are combined with AND. Other filters are
/// meant for another consumer and are skipped.
pub fn exact_match_condition_for(
    filters: &[Filter],
    filter_type: &FilterType,
    column: &str,
) -> Option<Predicate> {
    let _timer = metrics::observe("relational");
    let predicates: Vec<Predicate> = filters
        .iter()
        .filter(|f| &f.filter_type == filter_type)
        .filter_map(|f| {
            let values = f.values();
            if values.is_empty() {
                trace!(filter_type = %f.filter_type, "no value, skipping");
                return None;
            }
            let column = column.to_string();
            Some(if f.is_excluded() {
                Predicate::NotIn { column, values }
            } else {
                Predicate::In { column, values }
            })
        })
        .collect();
    let predicate = Predicate::all(predicates);
    if let Some(p) = &predicate {
        debug!(sql = %p.to_sql().0, "compiled relational condition");
    }
    predicate
}
