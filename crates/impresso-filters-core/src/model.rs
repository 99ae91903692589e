use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator selecting the per-type adapter. Types the compiler does not
/// know are kept verbatim so that consumers sharing one filter list can skip them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterType {
    String,
    Title,
    Daterange,
    Newspaper,
    Year,
    Language,
    Type,
    Country,
    Collection,
    Topic,
    Person,
    Location,
    Entity,
    Uid,
    Issue,
    Page,
    Partner,
    AccessRight,
    IsFront,
    HasTextContents,
    ContentLength,
    TextReuseCluster,
    TextReuseClusterSize,
    TextReuseClusterLexicalOverlap,
    TextReuseClusterDayDelta,
    WikidataId,
    Unknown(String),
}

impl FilterType {
    pub fn as_str(&self) -> &str {
        match self {
            FilterType::String => "string",
            FilterType::Title => "title",
            FilterType::Daterange => "daterange",
            FilterType::Newspaper => "newspaper",
            FilterType::Year => "year",
            FilterType::Language => "language",
            FilterType::Type => "type",
            FilterType::Country => "country",
            FilterType::Collection => "collection",
            FilterType::Topic => "topic",
            FilterType::Person => "person",
            FilterType::Location => "location",
            FilterType::Entity => "entity",
            FilterType::Uid => "uid",
            FilterType::Issue => "issue",
            FilterType::Page => "page",
            FilterType::Partner => "partner",
            FilterType::AccessRight => "accessRight",
            FilterType::IsFront => "isFront",
            FilterType::HasTextContents => "hasTextContents",
            FilterType::ContentLength => "contentLength",
            FilterType::TextReuseCluster => "textReuseCluster",
            FilterType::TextReuseClusterSize => "textReuseClusterSize",
            FilterType::TextReuseClusterLexicalOverlap => "textReuseClusterLexicalOverlap",
            FilterType::TextReuseClusterDayDelta => "textReuseClusterDayDelta",
            FilterType::WikidataId => "wikidataId",
            FilterType::Unknown(name) => name,
        }
    }

    /// Free-text types compile into the main query rather than a filter query.
    pub fn is_text(&self) -> bool {
        matches!(self, FilterType::String | FilterType::Title)
    }

    /// Boolean-flag types ignore `q` entirely.
    pub fn is_flag(&self) -> bool {
        matches!(self, FilterType::IsFront | FilterType::HasTextContents)
    }

    pub fn is_numeric_range(&self) -> bool {
        matches!(
            self,
            FilterType::ContentLength
                | FilterType::TextReuseClusterSize
                | FilterType::TextReuseClusterLexicalOverlap
                | FilterType::TextReuseClusterDayDelta
        )
    }
}

impl From<String> for FilterType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "string" => FilterType::String,
            "title" => FilterType::Title,
            "daterange" => FilterType::Daterange,
            "newspaper" => FilterType::Newspaper,
            "year" => FilterType::Year,
            "language" => FilterType::Language,
            "type" => FilterType::Type,
            "country" => FilterType::Country,
            "collection" => FilterType::Collection,
            "topic" => FilterType::Topic,
            "person" => FilterType::Person,
            "location" => FilterType::Location,
            "entity" => FilterType::Entity,
            "uid" => FilterType::Uid,
            "issue" => FilterType::Issue,
            "page" => FilterType::Page,
            "partner" => FilterType::Partner,
            "accessRight" => FilterType::AccessRight,
            "isFront" => FilterType::IsFront,
            "hasTextContents" => FilterType::HasTextContents,
            "contentLength" => FilterType::ContentLength,
            "textReuseCluster" => FilterType::TextReuseCluster,
            "textReuseClusterSize" => FilterType::TextReuseClusterSize,
            "textReuseClusterLexicalOverlap" => FilterType::TextReuseClusterLexicalOverlap,
            "textReuseClusterDayDelta" => FilterType::TextReuseClusterDayDelta,
            "wikidataId" => FilterType::WikidataId,
            _ => FilterType::Unknown(s),
        }
    }
}

impl From<&str> for FilterType {
    fn from(s: &str) -> Self {
        FilterType::from(s.to_string())
    }
}

impl From<FilterType> for String {
    fn from(t: FilterType) -> Self {
        match t {
            FilterType::Unknown(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    #[default]
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Op {
    And,
    Or,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::And => "AND",
            Op::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Exact,
    Partial,
    Fuzzy,
    Soft,
}

/// `q` of a filter: one scalar or a list. Numbers and booleans on the wire
/// are accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged, from = "RawValue")]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<RawScalar> for String {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Str(s) => s,
            RawScalar::Int(i) => i.to_string(),
            RawScalar::Float(f) => f.to_string(),
            RawScalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    One(RawScalar),
    Many(Vec<RawScalar>),
}

impl From<RawValue> for FilterValue {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::One(s) => FilterValue::One(s.into()),
            RawValue::Many(v) => FilterValue::Many(v.into_iter().map(String::from).collect()),
        }
    }
}

impl FilterValue {
    /// All values in order; a scalar is a one-element list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            FilterValue::One(s) => vec![s.clone()],
            FilterValue::Many(v) => v.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FilterValue::One(_) => 1,
            FilterValue::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::One(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::One(s)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(v: Vec<&str>) -> Self {
        FilterValue::Many(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        FilterValue::Many(v)
    }
}

/// One declarative search constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default)]
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<Precision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<FilterValue>,
}

impl Filter {
    pub fn new(filter_type: impl Into<FilterType>) -> Self {
        Self {
            filter_type: filter_type.into(),
            context: Context::Include,
            op: None,
            precision: None,
            q: None,
        }
    }

    pub fn with_q(mut self, q: impl Into<FilterValue>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_op(mut self, op: Op) -> Self {
        self.op = Some(op);
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn excluded(self) -> Self {
        self.with_context(Context::Exclude)
    }

    pub fn is_excluded(&self) -> bool {
        self.context == Context::Exclude
    }

    /// Usable values of `q`. Blank strings do not count as values, so a filter
    /// whose values are all blank behaves like a wildcard.
    pub fn values(&self) -> Vec<String> {
        self.q
            .as_ref()
            .map(FilterValue::to_vec)
            .unwrap_or_default()
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect()
    }

    /// `true` when the filter carries no usable value and therefore means "anything".
    pub fn is_wildcard(&self) -> bool {
        self.values().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_scalar_and_array_q() {
        let f: Filter = serde_json::from_str(r#"{"type":"language","q":["fr","en"]}"#).unwrap();
        assert_eq!(f.filter_type, FilterType::Language);
        assert_eq!(f.context, Context::Include);
        assert_eq!(f.q, Some(FilterValue::Many(vec!["fr".into(), "en".into()])));

        let f: Filter =
            serde_json::from_str(r#"{"type":"string","q":"moon","context":"exclude","op":"OR","precision":"fuzzy"}"#)
                .unwrap();
        assert_eq!(f.q, Some(FilterValue::One("moon".into())));
        assert!(f.is_excluded());
        assert_eq!(f.op, Some(Op::Or));
        assert_eq!(f.precision, Some(Precision::Fuzzy));
    }

    #[test]
    fn numeric_values_are_kept_as_text() {
        let f: Filter =
            serde_json::from_str(r#"{"type":"textReuseClusterSize","q":[2, 100]}"#).unwrap();
        assert_eq!(f.values(), vec!["2".to_string(), "100".to_string()]);
    }

    #[test]
    fn unknown_types_round_trip() {
        let f: Filter = serde_json::from_str(r#"{"type":"nag","q":"x"}"#).unwrap();
        assert_eq!(f.filter_type, FilterType::Unknown("nag".into()));
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["type"], "nag");
    }

    #[test]
    fn absent_empty_and_blank_values_are_wildcards() {
        assert!(Filter::new("string").is_wildcard());
        assert!(Filter::new("string").with_q(Vec::<String>::new()).is_wildcard());
        assert!(Filter::new("string").with_q("  ").is_wildcard());
        assert!(!Filter::new("string").with_q("0").is_wildcard());
    }
}
