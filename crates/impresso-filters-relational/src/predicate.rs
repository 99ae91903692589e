use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column values of one row, as text.
pub type Row = BTreeMap<String, String>;

/// `WHERE` predicate over exact column values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    In { column: String, values: Vec<String> },
    NotIn { column: String, values: Vec<String> },
    And { predicates: Vec<Predicate> },
}

impl Predicate {
    /// AND of `predicates`; a single predicate is returned as is and none
    /// yields `None`.
    pub fn all(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And { predicates }),
        }
    }

    /// SQL text with `?` placeholders and the values to bind, in placeholder order.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut binds = Vec::new();
        let sql = self.write_sql(&mut binds);
        (sql, binds)
    }

    fn write_sql(&self, binds: &mut Vec<String>) -> String {
        match self {
            Predicate::In { column, values } => {
                binds.extend(values.iter().cloned());
                format!("{column} IN ({})", placeholders(values.len()))
            }
            Predicate::NotIn { column, values } => {
                binds.extend(values.iter().cloned());
                format!("{column} NOT IN ({})", placeholders(values.len()))
            }
            Predicate::And { predicates } => {
                let parts: Vec<String> = predicates.iter().map(|p| p.write_sql(binds)).collect();
                format!("({})", parts.join(" AND "))
            }
        }
    }

    /// Evaluates the predicate against one row. A missing column is NULL and
    /// satisfies neither `IN` nor `NOT IN`.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Predicate::In { column, values } => row
                .get(column)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Predicate::NotIn { column, values } => row
                .get(column)
                .map(|v| !values.contains(v))
                .unwrap_or(false),
            Predicate::And { predicates } => predicates.iter().all(|p| p.matches(row)),
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
