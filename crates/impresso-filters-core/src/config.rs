use serde::{Deserialize, Serialize};

pub const UNIVERSAL_QUERY: &str = "*:*";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Languages used to fan out multilingual text fields, in output order.
    pub languages: Vec<String>,
    /// Match-everything token of the engine.
    pub universal_query: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".into(), "fr".into(), "de".into()],
            universal_query: UNIVERSAL_QUERY.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Defaults overridden by `IMPRESSO_FILTER_LANGUAGES` (comma separated)
    /// and `IMPRESSO_FILTER_UNIVERSAL_QUERY`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(langs) = std::env::var("IMPRESSO_FILTER_LANGUAGES")
            .ok()
            .map(|s| parse_languages(&s))
            .filter(|l| !l.is_empty())
        {
            cfg.languages = langs;
        }
        if let Some(token) = std::env::var("IMPRESSO_FILTER_UNIVERSAL_QUERY")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            cfg.universal_query = token.trim().to_string();
        }
        cfg
    }
}

fn parse_languages(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
