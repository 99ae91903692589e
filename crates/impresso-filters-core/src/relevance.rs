//! Relevance formulas: weighted context items compiled to nested
//! function-query calls used to re-rank matched documents.

use crate::metrics;
use crate::text::escape_id_value;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const YEAR_FIELD: &str = "meta_year_i";
const LOCATIONS_FIELD: &str = "loc_entities_dpfs";
const PERSONS_FIELD: &str = "pers_entities_dpfs";
const TOPICS_FIELD: &str = "topics_dpfs";
const CLUSTERS_FIELD: &str = "cluster_id_ss";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedId {
    pub id: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeParameters {
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityParameters {
    #[serde(default)]
    pub entities: Vec<WeightedId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopicParameters {
    #[serde(default)]
    pub topics: Vec<WeightedId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterParameters {
    #[serde(default)]
    pub text_reuse_clusters: Vec<WeightedId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "camelCase")]
pub enum ContextKind {
    TimeRange(TimeRangeParameters),
    Locations(EntityParameters),
    Persons(EntityParameters),
    Topics(TopicParameters),
    TextReuseClusters(ClusterParameters),
}

/// `{ "type": ..., "weight": ..., "parameters": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceContextItem {
    #[serde(flatten)]
    pub kind: ContextKind,
    pub weight: f64,
}

fn number(n: f64) -> String {
    if !n.is_finite() {
        warn!(weight = n, "non-finite weight replaced by 0.0");
        return "0.0".to_string();
    }
    if n.fract() == 0.0 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

fn quote_arg(s: &str) -> String {
    format!("'{}'", s.replace('\'', "\\'"))
}

/// `sum(...)` needs at least two arguments: none is the neutral `1.0`, one is used bare.
fn sum_terms(terms: Vec<String>) -> String {
    match terms.len() {
        0 => "1.0".to_string(),
        1 => terms.into_iter().next().unwrap_or_default(),
        _ => format!("sum({})", terms.join(",")),
    }
}

fn time_range_condition(p: &TimeRangeParameters) -> String {
    match (p.start_year, p.end_year) {
        (Some(start), Some(end)) => format!(
            "if(and(lte({YEAR_FIELD},{end}),gte({YEAR_FIELD},{start})),1.0,0.0)"
        ),
        (Some(start), None) => format!("if(gte({YEAR_FIELD},{start}),1.0,0.0)"),
        (None, Some(end)) => format!("if(lte({YEAR_FIELD},{end}),1.0,0.0)"),
        (None, None) => "1.0".to_string(),
    }
}

fn payload_terms(field: &str, ids: &[WeightedId]) -> String {
    sum_terms(
        ids.iter()
            .map(|e| format!("mul(payload({field},{}),{})", quote_arg(&e.id), number(e.weight)))
            .collect(),
    )
}

fn cluster_terms(ids: &[WeightedId]) -> String {
    sum_terms(
        ids.iter()
            .map(|c| {
                let q = format!("{CLUSTERS_FIELD}:{}", escape_id_value(&c.id));
                format!("mul(exists(query({{!v={}}})),{})", quote_arg(&q), number(c.weight))
            })
            .collect(),
    )
}

/// Removes whitespace outside single-quoted arguments so the formula is one token.
pub fn normalize_formula(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut quoted = false;
    let mut escaped = false;
    for c in formula.chars() {
        if quoted {
            if c == '\'' && !escaped {
                quoted = false;
            }
            escaped = c == '\\' && !escaped;
            out.push(c);
        } else if c == '\'' {
            quoted = true;
            out.push(c);
        } else if !c.is_whitespace() {
            out.push(c);
        }
    }
    out
}

pub fn relevance_context_item_to_formula(item: &RelevanceContextItem) -> String {
    let _timer = metrics::observe("relevance");
    let inner = match &item.kind {
        ContextKind::TimeRange(p) => time_range_condition(p),
        ContextKind::Locations(p) => payload_terms(LOCATIONS_FIELD, &p.entities),
        ContextKind::Persons(p) => payload_terms(PERSONS_FIELD, &p.entities),
        ContextKind::Topics(p) => payload_terms(TOPICS_FIELD, &p.topics),
        ContextKind::TextReuseClusters(p) => cluster_terms(&p.text_reuse_clusters),
    };
    let formula = normalize_formula(&format!("mul({inner},{})", number(item.weight)));
    debug!(%formula, "compiled relevance item");
    formula
}

/// Sums the formulas of several context items, or `None` when there are none.
pub fn combine_relevance_formulas(items: &[RelevanceContextItem]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(sum_terms(
        items.iter().map(relevance_context_item_to_formula).collect(),
    ))
}
