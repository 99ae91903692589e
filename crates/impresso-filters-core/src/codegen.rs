//! Renders a filter list as a call into the Python client library, for
//! display and copy-paste. The layout is fixed so output is diff-stable.

use crate::metrics;
use crate::model::{Filter, FilterType, Precision};
use crate::ranges::{date_range_bounds, split_range};
use tracing::trace;

const CLIENT_ROOT: &str = "impresso";

/// Keyword argument of the client for `filter_type`, if it has one.
pub fn keyword_argument(filter_type: &FilterType) -> Option<&'static str> {
    use FilterType as T;
    match filter_type {
        T::String => Some("term"),
        T::Title => Some("title"),
        T::Daterange => Some("date_range"),
        T::Newspaper => Some("newspaper_id"),
        T::Year => Some("year"),
        T::Language => Some("language"),
        T::Type => Some("content_type"),
        T::Country => Some("country"),
        T::Collection => Some("collection_id"),
        T::Topic => Some("topic_id"),
        T::Person => Some("mentioned_person_id"),
        T::Location => Some("mentioned_location_id"),
        T::Entity => Some("entity_id"),
        T::Issue => Some("issue_id"),
        T::Partner => Some("partner_id"),
        T::AccessRight => Some("access_rights"),
        T::IsFront => Some("front_page"),
        T::ContentLength => Some("content_length"),
        T::TextReuseCluster => Some("cluster_id"),
        T::TextReuseClusterSize => Some("cluster_size"),
        T::TextReuseClusterLexicalOverlap => Some("lexical_overlap"),
        T::TextReuseClusterDayDelta => Some("day_delta"),
        T::WikidataId => Some("wikidata_id"),
        T::Uid | T::Page | T::HasTextContents | T::Unknown(_) => None,
    }
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn number_literal(s: &str) -> String {
    let s = s.trim();
    if s == "*" {
        return "None".to_string();
    }
    if s.parse::<i64>().is_ok() || s.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
        s.to_string()
    } else {
        string_literal(s)
    }
}

fn date_range_literal(value: &str) -> String {
    match date_range_bounds(value) {
        Some((start, end)) => format!(
            "DateRange({}, {})",
            string_literal(&start),
            string_literal(&end)
        ),
        None => string_literal(value),
    }
}

fn numeric_range_literal(values: &[String]) -> Option<String> {
    match values {
        [min, max] => Some(format!("({}, {})", number_literal(min), number_literal(max))),
        [single] => split_range(single)
            .map(|(min, max)| format!("({}, {})", number_literal(min), number_literal(max))),
        _ => None,
    }
}

fn item_literal(filter_type: &FilterType, value: &str) -> String {
    match filter_type {
        FilterType::Daterange => date_range_literal(value),
        _ => string_literal(value),
    }
}

/// Expression for the value of `filter`, or `None` when it should be skipped.
fn value_expression(filter: &Filter) -> Option<String> {
    if filter.filter_type.is_flag() {
        let flag = if filter.is_excluded() { "False" } else { "True" };
        return Some(flag.to_string());
    }
    let base = if filter.filter_type.is_numeric_range() {
        numeric_range_literal(&filter.values())?
    } else {
        let values = filter.values();
        match values.as_slice() {
            [] => return None,
            [v] => item_literal(&filter.filter_type, v),
            many => {
                let items: Vec<String> = many
                    .iter()
                    .map(|v| item_literal(&filter.filter_type, v))
                    .collect();
                let list = format!("[{}]", items.join(", "));
                match filter.op {
                    Some(op) => format!("{}({list})", op.as_str()),
                    None => list,
                }
            }
        }
    };
    let base = if filter.precision == Some(Precision::Fuzzy) {
        format!("Fuzzy({base})")
    } else {
        base
    };
    Some(if filter.is_excluded() {
        format!("~{base}")
    } else {
        base
    })
}

/// `impresso.<resource>.<function>(...)` with one keyword argument per
/// eligible filter. Unmapped types and filters without a value are skipped.
pub fn compile_to_function_call(resource: &str, function: &str, filters: &[Filter]) -> String {
    let _timer = metrics::observe("python");
    let args: Vec<String> = filters
        .iter()
        .filter_map(|f| {
            let Some(name) = keyword_argument(&f.filter_type) else {
                trace!(filter_type = %f.filter_type, "no keyword argument, skipping");
                return None;
            };
            let Some(expr) = value_expression(f) else {
                trace!(filter_type = %f.filter_type, "no value, skipping");
                return None;
            };
            Some(format!("{name}={expr}"))
        })
        .collect();
    let call = format!("{CLIENT_ROOT}.{resource}.{function}");
    if args.is_empty() {
        format!("{call}()")
    } else {
        format!("{call}(\n\t{}\n)", args.join(",\n\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Op;

    #[test]
    fn no_filters_render_empty_call() {
        assert_eq!(compile_to_function_call("search", "find", &[]), "impresso.search.find()");
    }

    #[test]
    fn daterange_becomes_date_range_call() {
        let f = Filter::new("daterange").with_q("1912-01-01T00:00:00Z TO 1942-10-31T23:59:59Z");
        assert_eq!(
            compile_to_function_call("search", "find", &[f]),
            "impresso.search.find(\n\tdate_range=DateRange(\"1912-01-01T00:00:00Z\", \"1942-10-31T23:59:59Z\")\n)"
        );
    }

    #[test]
    fn arrays_with_op_are_wrapped_and_singletons_unwrapped() {
        let filters = vec![
            Filter::new("newspaper").with_q(vec!["GDL", "JDG"]).with_op(Op::Or),
            Filter::new("language").with_q(vec!["fr"]).with_op(Op::And),
            Filter::new("topic").with_q(vec!["tm-1", "tm-2"]),
        ];
        assert_eq!(
            compile_to_function_call("search", "find", &filters),
            "impresso.search.find(\n\tnewspaper_id=OR([\"GDL\", \"JDG\"]),\n\tlanguage=\"fr\",\n\ttopic_id=[\"tm-1\", \"tm-2\"]\n)"
        );
    }

    #[test]
    fn fuzzy_and_exclude_wrap_in_order() {
        let f = Filter::new("string")
            .with_q("moon")
            .with_precision(Precision::Fuzzy)
            .excluded();
        assert_eq!(
            compile_to_function_call("search", "find", &[f]),
            "impresso.search.find(\n\tterm=~Fuzzy(\"moon\")\n)"
        );
    }

    #[test]
    fn unmapped_and_valueless_filters_are_skipped() {
        let filters = vec![
            Filter::new("uid").with_q("x"),
            Filter::new("nag").with_q("y"),
            Filter::new("newspaper"),
            Filter::new("country").with_q("CH"),
        ];
        assert_eq!(
            compile_to_function_call("search", "find", &filters),
            "impresso.search.find(\n\tcountry=\"CH\"\n)"
        );
    }

    #[test]
    fn numeric_ranges_are_tuples_and_flags_true() {
        let filters = vec![
            Filter::new("textReuseClusterSize").with_q(vec!["2", "100"]),
            Filter::new("isFront"),
            Filter::new("contentLength").with_q("100 TO *").excluded(),
        ];
        assert_eq!(
            compile_to_function_call("text_reuse.clusters", "find", &filters),
            "impresso.text_reuse.clusters.find(\n\tcluster_size=(2, 100),\n\tfront_page=True,\n\tcontent_length=~(100, None)\n)"
        );
    }

    #[test]
    fn excluded_flag_is_false() {
        let f = Filter::new("isFront").excluded();
        assert_eq!(
            compile_to_function_call("search", "find", &[f]),
            "impresso.search.find(\n\tfront_page=False\n)"
        );
    }

    #[test]
    fn string_literals_are_escaped() {
        let f = Filter::new("string").with_q("say \"hi\"");
        assert_eq!(
            compile_to_function_call("search", "find", &[f]),
            "impresso.search.find(\n\tterm=\"say \\\"hi\\\"\"\n)"
        );
    }
}
