//! Assembles compiled filters into the query document sent to the engine.

use crate::adapters::{type_group_statement, Namespace};
use crate::aggregate::aggregate_filters_by_type;
use crate::config::CompilerConfig;
use crate::errors::Result;
use crate::metrics;
use crate::model::{Filter, FilterType, Op};
use crate::relevance::{combine_relevance_formulas, RelevanceContextItem};
use crate::statement::{FilterStatement, StatementItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const RERANK_DOCS: usize = 1000;

/// Main query plus independent filter-query clauses, in input type order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolrQueryParts {
    pub query: String,
    pub filter: Vec<String>,
}

/// Splits off filters answered by the relational store (`wikidataId`).
pub fn split_relational_filters(filters: &[Filter]) -> (Vec<Filter>, Vec<Filter>) {
    filters
        .iter()
        .cloned()
        .partition(|f| f.filter_type != FilterType::WikidataId)
}

fn group_by_type(filters: &[Filter]) -> Vec<(FilterType, Vec<Filter>)> {
    let mut groups: Vec<(FilterType, Vec<Filter>)> = Vec::new();
    for f in filters {
        match groups.iter_mut().find(|(t, _)| *t == f.filter_type) {
            Some((_, members)) => members.push(f.clone()),
            None => groups.push((f.filter_type.clone(), vec![f.clone()])),
        }
    }
    groups
}

fn and_of(statements: Vec<FilterStatement>) -> FilterStatement {
    FilterStatement::new(
        Op::And,
        statements.into_iter().map(StatementItem::Statement).collect(),
    )
}

/// Compiles `filters` as given into one expression; an empty list yields the
/// universal token.
pub fn filters_to_solr(
    filters: &[Filter],
    namespace: Namespace,
    config: &CompilerConfig,
) -> Result<String> {
    let statements = group_by_type(filters)
        .iter()
        .map(|(t, members)| type_group_statement(t, members, namespace, config))
        .collect::<Result<Vec<_>>>()?;
    Ok(and_of(statements).render(&config.universal_query))
}

/// Normalizes `filters` and compiles free-text types into the main query and
/// every other type into its own filter-query clause. `wikidataId` filters
/// are left out; see [`split_relational_filters`].
pub fn filters_to_query_and_filter_queries(
    filters: &[Filter],
    namespace: Namespace,
    config: &CompilerConfig,
) -> Result<SolrQueryParts> {
    let _timer = metrics::observe("solr");
    let (engine_filters, _relational) = split_relational_filters(filters);
    let normalized = aggregate_filters_by_type(&engine_filters);

    let mut query_statements = Vec::new();
    let mut filter = Vec::new();
    for (t, members) in group_by_type(&normalized) {
        let statement = type_group_statement(&t, &members, namespace, config)?;
        if t.is_text() {
            query_statements.push(statement);
        } else {
            filter.push(statement.render(&config.universal_query));
        }
    }
    let parts = SolrQueryParts {
        query: and_of(query_statements).render(&config.universal_query),
        filter,
    };
    debug!(%namespace, query = %parts.query, filters = parts.filter.len(), "compiled solr query");
    Ok(parts)
}

/// Query document handed to the search-engine client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub filter: Vec<String>,
    pub limit: usize,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl SearchRequest {
    pub fn new(parts: SolrQueryParts) -> Self {
        Self {
            query: parts.query,
            filter: parts.filter,
            limit: 10,
            offset: 0,
            sort: None,
            params: BTreeMap::new(),
        }
    }

    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Re-ranks the top documents with the summed formula of `items`.
    /// No items leaves the request unchanged.
    pub fn with_relevance(mut self, items: &[RelevanceContextItem]) -> Self {
        if let Some(formula) = combine_relevance_formulas(items) {
            self.params.insert(
                "rq".to_string(),
                format!("{{!rerank reRankQuery=$rqq reRankDocs={RERANK_DOCS} reRankWeight=1}}"),
            );
            self.params.insert("rqq".to_string(), format!("{{!func}}{formula}"));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Precision;

    fn compile(filters: &[Filter]) -> SolrQueryParts {
        filters_to_query_and_filter_queries(filters, Namespace::Search, &CompilerConfig::default())
            .unwrap()
    }

    #[test]
    fn no_filters_match_everything() {
        let parts = compile(&[]);
        assert_eq!(parts.query, "*:*");
        assert!(parts.filter.is_empty());
    }

    #[test]
    fn text_goes_to_query_and_other_types_to_filter_queries() {
        let parts = compile(&[
            Filter::new("newspaper").with_q(vec!["GDL", "JDG"]),
            Filter::new("string").with_q("lune").with_precision(Precision::Exact),
            Filter::new("language").with_q("fr").excluded(),
        ]);
        assert_eq!(
            parts.query,
            "(content_txt_en:\"lune\" OR content_txt_fr:\"lune\" OR content_txt_de:\"lune\" OR content_txt:\"lune\")"
        );
        assert_eq!(
            parts.filter,
            vec![
                "(meta_journal_s:GDL OR meta_journal_s:JDG)".to_string(),
                "NOT lg_s:fr".to_string(),
            ]
        );
    }

    #[test]
    fn same_type_filters_share_one_clause() {
        let parts = compile(&[
            Filter::new("topic").with_q("t1").with_op(Op::Or),
            Filter::new("topic").with_q("t2").with_op(Op::And),
        ]);
        assert_eq!(parts.filter, vec!["(topics_dpfs:t1 AND topics_dpfs:t2)".to_string()]);
    }

    #[test]
    fn wikidata_filters_are_left_to_the_relational_store() {
        let filters = vec![
            Filter::new("wikidataId").with_q("Q42"),
            Filter::new("year").with_q("1918"),
        ];
        let parts = compile(&filters);
        assert_eq!(parts.filter, vec!["meta_year_i:1918".to_string()]);
        let (engine, relational) = split_relational_filters(&filters);
        assert_eq!(engine.len(), 1);
        assert_eq!(relational, vec![Filter::new("wikidataId").with_q("Q42")]);
    }

    #[test]
    fn daterange_only_list_compiles_to_universal_when_empty() {
        let cfg = CompilerConfig::default();
        assert_eq!(filters_to_solr(&[], Namespace::Search, &cfg).unwrap(), "*:*");
        let out = filters_to_solr(
            &[Filter::new("daterange").with_q("1900-01-01 TO 1900-12-31")],
            Namespace::Search,
            &cfg,
        )
        .unwrap();
        assert_eq!(out, "meta_date_dt:[1900-01-01T00:00:00Z TO 1900-12-31T23:59:59Z]");
    }

    #[test]
    fn request_carries_rerank_formula() {
        let items: Vec<RelevanceContextItem> = serde_json::from_str(
            r#"[{"type":"timeRange","weight":1,"parameters":{"startYear":1900}}]"#,
        )
        .unwrap();
        let req = SearchRequest::new(compile(&[]))
            .with_page(20, 40)
            .with_relevance(&items);
        assert_eq!(req.limit, 20);
        assert_eq!(req.offset, 40);
        assert_eq!(
            req.params.get("rqq").map(String::as_str),
            Some("{!func}mul(if(gte(meta_year_i,1900),1.0,0.0),1.0)")
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "*:*");
        assert!(json.get("sort").is_none());

        let sorted = req.with_sort("meta_date_dt asc");
        assert_eq!(sorted.sort.as_deref(), Some("meta_date_dt asc"));
    }
}
