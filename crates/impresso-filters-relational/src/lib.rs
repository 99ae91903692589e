//! Exact-match filters compiled to relational `IN` / `NOT IN` predicates for
//! callers that answer them from the database instead of the search engine.

pub mod condition;
pub mod predicate;

pub use condition::{
    build_relational_exact_match_condition, exact_match_condition_for, WIKIDATA_COLUMN,
};
pub use predicate::{Predicate, Row};
