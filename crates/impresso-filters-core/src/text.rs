//! Value escaping and free-text precision handling.

use crate::errors::Result;
use crate::model::{Filter, Precision};

const KEYWORDS: [&str; 3] = ["AND", "OR", "NOT"];
const SPECIAL_CHARS: &[char] = &[
    '(', ')', '\\', '+', '-', '&', '|', '!', '{', '}', '[', ']', '?', '*', ':', ';', ',', '"',
    '/', '^', '~',
];

/// Backslash-escapes characters with a meaning in the query syntax, inner
/// whitespace included, so the value stays one term.
/// Used for identifiers such as `aida-0001-54-Chinese_(language)`.
pub fn escape_id_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if SPECIAL_CHARS.contains(&c) || c.is_whitespace() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes a single free-text word. Boolean keywords used as words are
/// quoted so the engine reads them literally.
fn escape_word(word: &str) -> String {
    if is_keyword(word) {
        format!("\"{word}\"")
    } else {
        escape_id_value(word)
    }
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Backslash-escapes every `"` not already escaped.
pub fn escape_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for c in value.chars() {
        if c == '"' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

/// Body of a phrase built from raw input: backslashes first, then quotes.
fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// Caller-supplied boolean queries such as `moon AND sun` pass through.
pub fn has_boolean_operators(value: &str) -> bool {
    value.contains(" AND ") || value.contains(" OR ")
}

/// Shapes one free-text value according to the filter's precision.
pub fn text_value(filter: &Filter, value: &str) -> Result<String> {
    let value = value.trim();
    if is_quoted(value) {
        return Ok(format!("\"{}\"", escape_quotes(&value[1..value.len() - 1])));
    }
    let words: Vec<&str> = value.split_whitespace().collect();
    let out = match filter.precision.unwrap_or(Precision::Partial) {
        Precision::Exact => format!("\"{}\"", escape_phrase(value)),
        Precision::Fuzzy => match words.as_slice() {
            [word] => wildcard_word(word),
            _ => format!("\"{}\"~1", escape_phrase(&words.join(" "))),
        },
        Precision::Soft => match words.as_slice() {
            [word] => escape_word(word),
            _ => {
                let parts: Vec<String> = words.iter().map(|w| escape_word(w)).collect();
                format!("({})", parts.join(" OR "))
            }
        },
        Precision::Partial if has_boolean_operators(value) => format!("({value})"),
        // Words keep input order; the wildcard goes on the last one.
        Precision::Partial => match words.split_last() {
            Some((last, [])) => wildcard_word(last),
            Some((last, rest)) => {
                let mut parts: Vec<String> = rest.iter().map(|w| escape_word(w)).collect();
                parts.push(wildcard_word(last));
                format!("({})", parts.join(" "))
            }
            None => String::from("*"),
        },
    };
    Ok(out)
}

fn wildcard_word(word: &str) -> String {
    if is_keyword(word) {
        escape_word(word)
    } else {
        format!("{}*", escape_id_value(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(precision: Option<Precision>, value: &str) -> String {
        let mut f = Filter::new("string").with_q(value);
        f.precision = precision;
        text_value(&f, value).unwrap()
    }

    #[test]
    fn exact_wraps_in_quotes_and_escapes_internal_quotes() {
        assert_eq!(text(Some(Precision::Exact), "la lune"), "\"la lune\"");
        assert_eq!(
            text(Some(Precision::Exact), "le \"petit\" prince"),
            "\"le \\\"petit\\\" prince\""
        );
    }

    #[test]
    fn fuzzy_uses_edit_distance_for_phrases_and_wildcard_for_words() {
        assert_eq!(text(Some(Precision::Fuzzy), "la  lune"), "\"la lune\"~1");
        assert_eq!(text(Some(Precision::Fuzzy), "lune"), "lune*");
    }

    #[test]
    fn soft_ors_words() {
        assert_eq!(text(Some(Precision::Soft), "moon sun"), "(moon OR sun)");
        assert_eq!(text(Some(Precision::Soft), "moon"), "moon");
        assert_eq!(text(Some(Precision::Soft), "cats AND dogs"), "(cats OR \"AND\" OR dogs)");
    }

    #[test]
    fn partial_wildcards_last_word() {
        assert_eq!(text(None, "moon"), "moon*");
        assert_eq!(text(Some(Precision::Partial), "full moo"), "(full moo*)");
    }

    #[test]
    fn partial_passes_boolean_queries_through() {
        assert_eq!(text(None, "moon AND sun"), "(moon AND sun)");
        assert_eq!(text(None, "moon OR sun"), "(moon OR sun)");
    }

    #[test]
    fn quoted_values_are_treated_as_exact() {
        assert_eq!(text(None, "\"la lune\""), "\"la lune\"");
        assert_eq!(text(Some(Precision::Soft), "\"a \"b\" c\""), "\"a \\\"b\\\" c\"");
        assert_eq!(text(None, "\"already \\\"escaped\\\"\""), "\"already \\\"escaped\\\"\"");
    }

    #[test]
    fn id_values_escape_query_syntax() {
        assert_eq!(
            escape_id_value("aida-0001-54-Chinese_(language)"),
            "aida\\-0001\\-54\\-Chinese_\\(language\\)"
        );
        assert_eq!(escape_id_value("a:b"), "a\\:b");
    }

    #[test]
    fn id_values_stay_one_term() {
        assert_eq!(escape_id_value(" Le Temps "), "Le\\ Temps");
        assert_eq!(escape_id_value("-abc"), "\\-abc");
        assert_eq!(escape_id_value("GDL*"), "GDL\\*");
    }

    #[test]
    fn backslashes_cannot_break_out_of_phrases() {
        assert_eq!(text(Some(Precision::Exact), "C:\\"), "\"C:\\\\\"");
        assert_eq!(text(Some(Precision::Exact), "a\\\"b"), "\"a\\\\\\\"b\"");
        assert_eq!(text(Some(Precision::Fuzzy), "dir C:\\"), "\"dir C:\\\\\"~1");
    }

    #[test]
    fn partial_wildcard_follows_input_order_not_length() {
        assert_eq!(text(None, "lune a"), "(lune a*)");
        assert_eq!(text(None, "a lune"), "(a lune*)");
    }
}
