use crate::model::{Filter, FilterType, FilterValue, Op};
use tracing::debug;

/// Groups filters by type (first-seen type order) and merges runs of
/// same-type filters that share `op` and `context` into one filter whose `q`
/// is the concatenation of the run's values.
///
/// Filters without `q` are dropped, except boolean flags whose `q` is
/// irrelevant. Flags and numeric ranges (whose `[min, max]` pair is a single
/// value) are never merged. A change of `op` (or `context`) closes the run and
/// starts a new sibling, so `OR [a, b]` followed by `AND c` stays two filters
/// and any alternating sequence stays fully split. Single values without `op`
/// merge as an explicit AND run; an array without `op` is never merged, since
/// its values are ORed while its siblings are ANDed.
pub fn aggregate_filters_by_type(filters: &[Filter]) -> Vec<Filter> {
    let mut groups: Vec<(FilterType, Vec<&Filter>)> = Vec::new();
    for f in filters {
        if f.q.is_none() && !f.filter_type.is_flag() {
            debug!(filter_type = %f.filter_type, "dropping filter without value");
            continue;
        }
        match groups.iter_mut().find(|(t, _)| *t == f.filter_type) {
            Some((_, members)) => members.push(f),
            None => groups.push((f.filter_type.clone(), vec![f])),
        }
    }

    let mut out = Vec::with_capacity(filters.len());
    for (filter_type, members) in groups {
        if filter_type.is_flag() || filter_type.is_numeric_range() {
            out.extend(members.into_iter().cloned());
            continue;
        }
        let mut run: Option<Filter> = None;
        for f in members {
            run = Some(match run.take() {
                Some(acc) if mergeable(&acc, f) => merge(acc, f),
                Some(acc) => {
                    out.push(acc);
                    f.clone()
                }
                None => f.clone(),
            });
        }
        out.extend(run);
    }
    out
}

/// Operator a filter can be merged under. Separate filters are ANDed, so a
/// single-valued filter without `op` merges as AND. A multi-valued filter
/// without `op` ORs its own values and has no flat-array equivalent.
fn merge_op(f: &Filter) -> Option<Op> {
    match f.op {
        Some(op) => Some(op),
        None if f.q.as_ref().map_or(0, FilterValue::len) <= 1 => Some(Op::And),
        None => None,
    }
}

fn mergeable(acc: &Filter, next: &Filter) -> bool {
    let op = merge_op(acc);
    op.is_some() && op == merge_op(next) && acc.context == next.context
}

fn merge(mut acc: Filter, next: &Filter) -> Filter {
    acc.op = merge_op(&acc);
    let mut values = acc.q.as_ref().map(FilterValue::to_vec).unwrap_or_default();
    values.extend(next.q.as_ref().map(FilterValue::to_vec).unwrap_or_default());
    acc.q = Some(FilterValue::Many(values));
    acc
}
