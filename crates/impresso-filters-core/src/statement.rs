//! Boolean statement builder.
//!
//! Filters are first turned into a [`FilterStatement`] tree (AND/OR/NOT over
//! field clauses) and only then rendered to query syntax. The tree is built by
//! folding over the input, never by mutating shared state, so the builder can
//! be called from any number of requests at once.

use crate::errors::{FilterError, Result};
use crate::metrics::COMPILE_ERRORS_TOTAL;
use crate::model::{Filter, Op};

/// Where the values of a filter are tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Literal field names, fanned out with OR.
    Fields(Vec<String>),
    /// Field-name prefix expanded once per configured language
    /// (`prefix_en`, `prefix_fr`, ...) plus the language-agnostic `prefix`.
    Multilingual(&'static str),
}

impl FieldSpec {
    pub fn single(field: &str) -> Self {
        FieldSpec::Fields(vec![field.to_string()])
    }

    pub fn many(fields: &[&str]) -> Self {
        FieldSpec::Fields(fields.iter().map(|f| f.to_string()).collect())
    }

    /// Resolves a multilingual prefix to literal fields. Literal specs are returned as is.
    pub fn expand(&self, languages: &[String]) -> FieldSpec {
        match self {
            FieldSpec::Fields(_) => self.clone(),
            FieldSpec::Multilingual(prefix) => {
                let mut fields: Vec<String> = languages
                    .iter()
                    .map(|lang| format!("{prefix}_{lang}"))
                    .collect();
                fields.push(prefix.to_string());
                FieldSpec::Fields(fields)
            }
        }
    }

    /// The literal field list. A prefix that was never expanded is a
    /// programming error and fails before anything is built.
    pub fn literal(&self, rule: &str) -> Result<&[String]> {
        match self {
            FieldSpec::Fields(fields) => Ok(fields),
            FieldSpec::Multilingual(prefix) => Err(FilterError::UnexpectedFieldPrefix {
                rule: rule.to_string(),
                prefix: prefix.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StatementItem {
    Clause(String),
    MatchAll,
    Statement(FilterStatement),
}

impl StatementItem {
    fn render(&self, universal: &str) -> String {
        match self {
            StatementItem::Clause(c) => c.clone(),
            StatementItem::MatchAll => universal.to_string(),
            StatementItem::Statement(s) => s.render(universal),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterStatement {
    pub items: Vec<StatementItem>,
    pub op: Op,
    pub negated: bool,
}

impl FilterStatement {
    pub fn new(op: Op, items: Vec<StatementItem>) -> Self {
        Self {
            items,
            op,
            negated: false,
        }
    }

    pub fn negate(self) -> Self {
        Self {
            negated: true,
            ..self
        }
    }

    /// One child renders bare, several are parenthesized and joined by the
    /// operator, none renders as the match-everything token.
    pub fn render(&self, universal: &str) -> String {
        let body = match self.items.as_slice() {
            [] => universal.to_string(),
            [only] => only.render(universal),
            items => {
                let sep = format!(" {} ", self.op.as_str());
                let parts: Vec<String> = items.iter().map(|i| i.render(universal)).collect();
                format!("({})", parts.join(&sep))
            }
        };
        if self.negated {
            format!("NOT {body}")
        } else {
            body
        }
    }
}

/// Per-type hooks used by the builder.
pub struct StatementRule<'a> {
    pub name: &'a str,
    /// Escapes and shapes one value of `filter`.
    pub transform_value: &'a dyn Fn(&Filter, &str) -> Result<String>,
    /// Builds the clause testing `value` on `field`.
    pub build_item: &'a dyn Fn(&str, &str) -> Result<String>,
    /// Maps a descriptor field to the physical field name.
    pub convert_field: &'a dyn Fn(&str) -> String,
}

pub(crate) fn build_filter_statement(
    filters: &[Filter],
    fields: &FieldSpec,
    rule: &StatementRule<'_>,
) -> Result<FilterStatement> {
    let fields = fields.literal(rule.name)?;
    let per_filter = filters
        .iter()
        .map(|f| filter_statement(f, fields, rule))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| {
            COMPILE_ERRORS_TOTAL.with_label_values(&[rule.name]).inc();
            e.within_rule(rule.name)
        })?;
    Ok(FilterStatement::new(
        Op::And,
        per_filter.into_iter().map(StatementItem::Statement).collect(),
    ))
}

fn filter_statement(
    filter: &Filter,
    fields: &[String],
    rule: &StatementRule<'_>,
) -> Result<FilterStatement> {
    let values = filter.values();
    let statement = if values.is_empty() {
        FilterStatement::new(Op::Or, vec![StatementItem::MatchAll])
    } else {
        let per_value = values
            .iter()
            .map(|v| value_statement(filter, v, fields, rule))
            .collect::<Result<Vec<_>>>()?;
        FilterStatement::new(
            filter.op.unwrap_or(Op::Or),
            per_value.into_iter().map(StatementItem::Statement).collect(),
        )
    };
    Ok(if filter.is_excluded() {
        statement.negate()
    } else {
        statement
    })
}

fn value_statement(
    filter: &Filter,
    value: &str,
    fields: &[String],
    rule: &StatementRule<'_>,
) -> Result<FilterStatement> {
    let transformed = (rule.transform_value)(filter, value)?;
    let items = fields
        .iter()
        .map(|field| {
            (rule.build_item)(&(rule.convert_field)(field), &transformed).map(StatementItem::Clause)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(FilterStatement::new(Op::Or, items))
}

/// Compiles `filters` into one boolean expression: values fanned out over
/// `fields` with OR, values combined by each filter's `op` (OR when absent),
/// excluded filters wrapped in `NOT`, filters joined with AND.
pub fn build_filter_expression(
    filters: &[Filter],
    fields: &FieldSpec,
    rule: &StatementRule<'_>,
    universal: &str,
) -> Result<String> {
    build_filter_statement(filters, fields, rule).map(|s| s.render(universal))
}

pub(crate) fn field_value_item(field: &str, value: &str) -> Result<String> {
    Ok(format!("{field}:{value}"))
}

pub(crate) fn identity_field(field: &str) -> String {
    field.to_string()
}
