//! Email and name extraction from spoken or typed input

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.+-]+@[\w.-]+\.\w+").unwrap());
static SPACED_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*@\s*").unwrap());
static SPACED_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\.\s*").unwrap());

/// Spoken-symbol replacements applied before the email regex. Order
/// matters: longer phrases first so " at the rate " does not leave
/// "the rate" behind.
const SPOKEN_SYMBOLS: &[(&str, &str)] = &[
    (" at the rate ", "@"),
    (" at rate ", "@"),
    (" at ", "@"),
    (" dot ", "."),
    (" period ", "."),
    (" underscore ", "_"),
];

/// Extract an email address, tolerating dictated forms like
/// "john at gmail dot com". Returns `None` when no address is present.
pub fn extract_email(speech: &str) -> Option<String> {
    let mut text = speech.to_lowercase().trim().to_string();

    for (spoken, symbol) in SPOKEN_SYMBOLS {
        text = text.replace(spoken, symbol);
    }
    let text = SPACED_AT.replace_all(&text, "@");
    let text = SPACED_DOT.replace_all(&text, ".");

    EMAIL_PATTERN
        .find(&text)
        .map(|m| m.as_str().to_string())
}

/// Courtesy prefixes people put before their name
const NAME_PREFIXES: &[&str] = &[
    "my name is",
    "this is",
    "i am",
    "i'm",
    "call me",
    "it's",
    "its",
];

/// Clean a self-introduction down to the bare name, title-cased.
/// "my name is john, nice to meet you" -> "John".
pub fn clean_name(speech: &str) -> String {
    let mut name = speech.trim().to_string();

    for prefix in NAME_PREFIXES {
        if name.to_lowercase().starts_with(prefix) {
            name = name[prefix.len()..].trim().to_string();
        }
    }

    let name = name.split(',').next().unwrap_or("").trim();

    name.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_email() {
        assert_eq!(
            extract_email("my email is john.doe@gmail.com thanks"),
            Some("john.doe@gmail.com".to_string())
        );
    }

    #[test]
    fn dictated_email() {
        assert_eq!(
            extract_email("john at gmail dot com"),
            Some("john@gmail.com".to_string())
        );
        assert_eq!(
            extract_email("priya underscore k at the rate yahoo dot in"),
            Some("priya_k@yahoo.in".to_string())
        );
    }

    #[test]
    fn no_email_is_none() {
        assert_eq!(extract_email("i dont have one"), None);
        assert_eq!(extract_email(""), None);
    }

    #[test]
    fn name_prefixes_are_stripped() {
        assert_eq!(clean_name("my name is john"), "John");
        assert_eq!(clean_name("I'm Priya Sharma"), "Priya Sharma");
        assert_eq!(clean_name("it's rahul"), "Rahul");
    }

    #[test]
    fn name_cut_at_comma_and_title_cased() {
        assert_eq!(clean_name("john, nice to meet you"), "John");
        assert_eq!(clean_name("ASHA VERMA"), "Asha Verma");
    }

    #[test]
    fn bare_name_passes_through() {
        assert_eq!(clean_name("Kiran"), "Kiran");
    }
}
