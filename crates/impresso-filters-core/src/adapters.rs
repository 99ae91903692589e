//! Per-type adapters: which fields a filter type targets in each namespace
//! and how its values become clauses.

use crate::config::CompilerConfig;
use crate::errors::{FilterError, Result};
use crate::model::{Filter, FilterType, FilterValue};
use crate::ranges::{date_range_value, numeric_range_filter, numeric_range_value};
use crate::statement::{
    build_filter_statement, field_value_item, identity_field, FieldSpec, FilterStatement,
    StatementRule,
};
use crate::text::{escape_id_value, text_value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Search-engine collection a query is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    #[default]
    Search,
    TextReusePassages,
    Images,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Search => "search",
            Namespace::TextReusePassages => "text_reuse_passages",
            Namespace::Images => "images",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Namespace {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "search" => Ok(Namespace::Search),
            "text_reuse_passages" | "tr_passages" => Ok(Namespace::TextReusePassages),
            "images" => Ok(Namespace::Images),
            other => Err(FilterError::Invalid(format!("unknown namespace '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text, shaped by precision.
    Text,
    /// Exact identifier or keyword match.
    Term,
    DateRange,
    NumericRange,
    /// Fixed predicate; `q` is ignored.
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub fields: FieldSpec,
    pub kind: ValueKind,
}

fn text(prefix: &'static str) -> FilterDescriptor {
    FilterDescriptor {
        fields: FieldSpec::Multilingual(prefix),
        kind: ValueKind::Text,
    }
}

fn term(fields: &[&str]) -> FilterDescriptor {
    FilterDescriptor {
        fields: FieldSpec::many(fields),
        kind: ValueKind::Term,
    }
}

fn date_range(field: &str) -> FilterDescriptor {
    FilterDescriptor {
        fields: FieldSpec::single(field),
        kind: ValueKind::DateRange,
    }
}

fn numeric(field: &str) -> FilterDescriptor {
    FilterDescriptor {
        fields: FieldSpec::single(field),
        kind: ValueKind::NumericRange,
    }
}

fn flag(clause: &str) -> FilterDescriptor {
    FilterDescriptor {
        fields: FieldSpec::single(clause),
        kind: ValueKind::Flag,
    }
}

/// Adapter for `filter_type` in `namespace`, or `None` when the type has no
/// field there. `wikidataId` never maps: it is a relational predicate.
pub fn descriptor(namespace: Namespace, filter_type: &FilterType) -> Option<FilterDescriptor> {
    use FilterType as T;
    use Namespace as N;
    let d = match (filter_type, namespace) {
        (T::String, N::Search | N::TextReusePassages) => text("content_txt"),
        (T::String, N::Images) => text("caption_txt"),
        (T::Title, N::Search | N::TextReusePassages) => text("title_txt"),
        (T::Title, N::Images) => return None,
        (T::Daterange, _) => date_range("meta_date_dt"),
        (T::Newspaper, _) => term(&["meta_journal_s"]),
        (T::Year, _) => term(&["meta_year_i"]),
        (T::Country, _) => term(&["meta_country_code_s"]),
        (T::Partner, _) => term(&["meta_partnerid_s"]),
        (T::Issue, _) => term(&["meta_issue_id_s"]),
        (T::Uid, _) => term(&["id"]),
        (T::Language, N::Search | N::TextReusePassages) => term(&["lg_s"]),
        (T::Language, N::Images) => return None,
        (T::Type, N::Search) => term(&["item_type_s"]),
        (T::Type, _) => return None,
        (T::Collection, N::Search | N::TextReusePassages) => term(&["ucoll_ss"]),
        (T::Collection, N::Images) => return None,
        (T::Topic, N::Search | N::TextReusePassages) => term(&["topics_dpfs"]),
        (T::Topic, N::Images) => return None,
        (T::Person, N::Search | N::TextReusePassages) => term(&["pers_entities_dpfs"]),
        (T::Person, N::Images) => return None,
        (T::Location, N::Search | N::TextReusePassages) => term(&["loc_entities_dpfs"]),
        (T::Location, N::Images) => return None,
        (T::Entity, N::Search | N::TextReusePassages) => {
            term(&["pers_entities_dpfs", "loc_entities_dpfs"])
        }
        (T::Entity, N::Images) => return None,
        (T::Page, N::Search | N::Images) => term(&["page_id_ss"]),
        (T::Page, N::TextReusePassages) => return None,
        (T::AccessRight, N::Search) => term(&["rights_data_domain_s"]),
        (T::AccessRight, _) => return None,
        (T::IsFront, N::Search | N::Images) => flag("front_b:1"),
        (T::IsFront, N::TextReusePassages) => return None,
        (T::HasTextContents, N::Search) => flag("content_length_i:[1 TO *]"),
        (T::HasTextContents, _) => return None,
        (T::ContentLength, N::Search | N::TextReusePassages) => numeric("content_length_i"),
        (T::ContentLength, N::Images) => return None,
        (T::TextReuseCluster, N::Search) => term(&["cluster_id_ss"]),
        (T::TextReuseCluster, N::TextReusePassages) => term(&["cluster_id_s"]),
        (T::TextReuseCluster, N::Images) => return None,
        (T::TextReuseClusterSize, N::TextReusePassages) => numeric("cluster_size_l"),
        (T::TextReuseClusterLexicalOverlap, N::TextReusePassages) => {
            numeric("cluster_lex_overlap_d")
        }
        (T::TextReuseClusterDayDelta, N::TextReusePassages) => numeric("cluster_day_delta_i"),
        (
            T::TextReuseClusterSize
            | T::TextReuseClusterLexicalOverlap
            | T::TextReuseClusterDayDelta,
            _,
        ) => return None,
        (T::WikidataId, _) | (T::Unknown(_), _) => return None,
    };
    Some(d)
}

fn term_value(_filter: &Filter, value: &str) -> Result<String> {
    Ok(escape_id_value(value))
}

fn flag_value(_filter: &Filter, _value: &str) -> Result<String> {
    Ok(String::new())
}

fn flag_item(clause: &str, _value: &str) -> Result<String> {
    Ok(clause.to_string())
}

fn build_group(
    name: &str,
    fields: &FieldSpec,
    transform_value: &dyn Fn(&Filter, &str) -> Result<String>,
    build_item: &dyn Fn(&str, &str) -> Result<String>,
    filters: &[Filter],
) -> Result<FilterStatement> {
    let rule = StatementRule {
        name,
        transform_value,
        build_item,
        convert_field: &identity_field,
    };
    build_filter_statement(filters, fields, &rule)
}

/// Builds the statement for filters that all share `filter_type`.
pub(crate) fn type_group_statement(
    filter_type: &FilterType,
    filters: &[Filter],
    namespace: Namespace,
    config: &CompilerConfig,
) -> Result<FilterStatement> {
    let d = descriptor(namespace, filter_type).ok_or_else(|| FilterError::UnsupportedType {
        filter_type: filter_type.to_string(),
        namespace: namespace.to_string(),
    })?;
    let name = filter_type.as_str();
    let fields = d.fields.expand(&config.languages);
    match d.kind {
        ValueKind::Text => build_group(name, &fields, &text_value, &field_value_item, filters),
        ValueKind::Term => build_group(name, &fields, &term_value, &field_value_item, filters),
        ValueKind::DateRange => {
            build_group(name, &fields, &date_range_value, &field_value_item, filters)
        }
        ValueKind::NumericRange => {
            let normalized = filters
                .iter()
                .map(numeric_range_filter)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| e.within_rule(name))?;
            build_group(name, &fields, &numeric_range_value, &field_value_item, &normalized)
        }
        ValueKind::Flag => {
            let normalized: Vec<Filter> = filters
                .iter()
                .map(|f| Filter {
                    q: Some(FilterValue::One("true".into())),
                    ..f.clone()
                })
                .collect();
            build_group(name, &fields, &flag_value, &flag_item, &normalized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(filters: &[Filter], namespace: Namespace) -> Result<String> {
        let cfg = CompilerConfig::default();
        let t = filters[0].filter_type.clone();
        type_group_statement(&t, filters, namespace, &cfg).map(|s| s.render("*:*"))
    }

    #[test]
    fn language_terms_are_ored() {
        let f = Filter::new("language").with_q(vec!["fr", "en"]);
        assert_eq!(compile(&[f.clone()], Namespace::Search).unwrap(), "(lg_s:fr OR lg_s:en)");
        assert_eq!(
            compile(&[f.excluded()], Namespace::Search).unwrap(),
            "NOT (lg_s:fr OR lg_s:en)"
        );
    }

    #[test]
    fn exact_string_is_repeated_over_every_text_field() {
        let f = Filter::new("string")
            .with_q("la lune")
            .with_precision(crate::model::Precision::Exact);
        assert_eq!(
            compile(&[f], Namespace::Search).unwrap(),
            "(content_txt_en:\"la lune\" OR content_txt_fr:\"la lune\" OR content_txt_de:\"la lune\" OR content_txt:\"la lune\")"
        );
    }

    #[test]
    fn daterange_values_are_ored_and_negated_as_a_whole() {
        let f = Filter::new("daterange")
            .with_q(vec![
                "1900-01-01T00:00:00Z TO 1900-12-31T00:00:00Z",
                "1950-01-01T00:00:00Z TO 1950-12-31T00:00:00Z",
            ])
            .excluded();
        assert_eq!(
            compile(&[f], Namespace::Search).unwrap(),
            "NOT (meta_date_dt:[1900-01-01T00:00:00Z TO 1900-12-31T23:59:59Z] OR meta_date_dt:[1950-01-01T00:00:00Z TO 1950-12-31T23:59:59Z])"
        );
    }

    #[test]
    fn malformed_daterange_fails_with_rule_context() {
        let f = Filter::new("daterange").with_q("1900 TO whenever");
        let err = compile(&[f], Namespace::Search).unwrap_err();
        assert!(matches!(err, FilterError::Rule { ref rule, .. } if rule == "daterange"));
        assert!(matches!(err.root_cause(), FilterError::InvalidDateRange(_)));
    }

    #[test]
    fn numeric_range_uses_mapped_field() {
        let f = Filter::new("textReuseClusterSize").with_q(vec!["2", "10"]);
        assert_eq!(
            compile(&[f], Namespace::TextReusePassages).unwrap(),
            "cluster_size_l:[2 TO 10]"
        );
    }

    #[test]
    fn flags_ignore_q() {
        let f = Filter::new("isFront").with_q("whatever");
        assert_eq!(compile(&[f], Namespace::Search).unwrap(), "front_b:1");
        let f = Filter::new("hasTextContents").excluded();
        assert_eq!(
            compile(&[f], Namespace::Search).unwrap(),
            "NOT content_length_i:[1 TO *]"
        );
    }

    #[test]
    fn entity_fans_out_over_person_and_location_fields() {
        let f = Filter::new("entity").with_q("aida-0001-50-Paris");
        assert_eq!(
            compile(&[f], Namespace::Search).unwrap(),
            "(pers_entities_dpfs:aida\\-0001\\-50\\-Paris OR loc_entities_dpfs:aida\\-0001\\-50\\-Paris)"
        );
    }

    #[test]
    fn term_values_with_spaces_or_leading_dash_stay_one_term() {
        let f = Filter::new("newspaper").with_q("Le Temps");
        assert_eq!(compile(&[f], Namespace::Search).unwrap(), "meta_journal_s:Le\\ Temps");
        let f = Filter::new("collection").with_q("-abc");
        assert_eq!(compile(&[f], Namespace::Search).unwrap(), "ucoll_ss:\\-abc");
    }

    #[test]
    fn unmapped_types_fail_fast() {
        for (f, ns) in [
            (Filter::new("textReuseClusterSize").with_q(vec!["1", "2"]), Namespace::Search),
            (Filter::new("wikidataId").with_q("Q42"), Namespace::Search),
            (Filter::new("nag").with_q("x"), Namespace::Search),
            (Filter::new("language").with_q("fr"), Namespace::Images),
        ] {
            let err = compile(&[f.clone()], ns).unwrap_err();
            match err {
                FilterError::UnsupportedType { filter_type, namespace } => {
                    assert_eq!(filter_type, f.filter_type.as_str());
                    assert_eq!(namespace, ns.as_str());
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn images_use_caption_fields() {
        let f = Filter::new("string").with_q("ship");
        let cfg = CompilerConfig {
            languages: vec!["fr".into()],
            ..CompilerConfig::default()
        };
        let out = type_group_statement(&FilterType::String, &[f], Namespace::Images, &cfg)
            .unwrap()
            .render("*:*");
        assert_eq!(out, "(caption_txt_fr:ship* OR caption_txt:ship*)");
    }
}
