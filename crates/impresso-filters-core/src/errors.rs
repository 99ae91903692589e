use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("filter type '{filter_type}' is not supported in namespace '{namespace}'")]
    UnsupportedType {
        filter_type: String,
        namespace: String,
    },
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("invalid numeric range: {0}")]
    InvalidNumericRange(String),
    #[error("rule '{rule}' expects literal fields, got multilingual prefix '{prefix}'")]
    UnexpectedFieldPrefix { rule: String, prefix: String },
    #[error("rule '{rule}' failed: {source}")]
    Rule {
        rule: String,
        #[source]
        source: Box<FilterError>,
    },
    #[error("wire decoding error: {0}")]
    Wire(String),
    #[error("invalid filter: {0}")]
    Invalid(String),
}

impl FilterError {
    /// Wraps `self` with the name of the rule that was compiling when it occurred.
    /// Already wrapped errors are left untouched so the innermost rule wins.
    pub fn within_rule(self, rule: &str) -> Self {
        match self {
            FilterError::Rule { .. } => self,
            other => FilterError::Rule {
                rule: rule.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping rule wrappers.
    pub fn root_cause(&self) -> &FilterError {
        match self {
            FilterError::Rule { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
