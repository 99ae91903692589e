//! Filter algebra compiler for the newspaper archive search API.
//!
//! One list of [`Filter`] values compiles to three targets:
//!
//! * a boolean main query and filter-query clauses for the search engine
//!   ([`filters_to_query_and_filter_queries`]),
//! * relevance formulas for re-ranking ([`relevance_context_item_to_formula`]),
//! * a call into the Python client library ([`compile_to_function_call`]).
//!
//! Compilation is pure: no I/O, no shared mutable state, deterministic output.

pub mod adapters;
pub mod aggregate;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod ranges;
pub mod relevance;
pub mod solr;
pub mod statement;
pub mod text;
pub mod util;
pub mod wire;

pub use adapters::{descriptor, FilterDescriptor, Namespace, ValueKind};
pub use aggregate::aggregate_filters_by_type;
pub use codegen::compile_to_function_call;
pub use config::CompilerConfig;
pub use errors::*;
pub use model::*;
pub use relevance::{
    combine_relevance_formulas, relevance_context_item_to_formula, ContextKind,
    RelevanceContextItem, WeightedId,
};
pub use solr::{
    filters_to_query_and_filter_queries, filters_to_solr, split_relational_filters,
    SearchRequest, SolrQueryParts,
};
pub use statement::{build_filter_expression, FieldSpec, StatementRule};
pub use util::filters_cache_key;
pub use wire::{decode_filters, encode_filters};
