//! Spoken budget parsing
//!
//! Turns utterances like "50 lakhs", "1-2 crore", "around 75 to 90" into a
//! numeric (min, max) range in absolute rupees. A single number is treated
//! as the ceiling with the floor at 70% of it. Unit words apply per side of
//! a range; a side with no unit falls back to a magnitude heuristic.

use once_cell::sync::Lazy;
use regex::Regex;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

static HEDGING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(around|approximately|about|give or take|roughly|maybe|nearly|almost)").unwrap()
});
static COMMA_IN_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d),(\d)").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Range separators, tried in order when splitting left/right contexts
const SEPARATORS: &[&str] = &[" to ", " - ", "-", " and ", ","];

/// Unit multiplier for one number, derived from its side of the text.
fn multiplier_for(value: f64, budget_text: &str, is_second: bool) -> f64 {
    let mut parts: Vec<String> = vec![budget_text.to_string()];
    for sep in SEPARATORS {
        parts = parts
            .iter()
            .flat_map(|p| p.split(sep).map(str::to_string))
            .collect();
    }

    let context = if is_second && parts.len() > 1 {
        parts[1].trim().to_lowercase()
    } else {
        parts
            .first()
            .map(|p| p.trim().to_lowercase())
            .unwrap_or_else(|| budget_text.to_lowercase())
    };

    if context.contains("crore") || context.contains(" cr") || context.ends_with("cr") {
        CRORE
    } else if context.contains("lakh") || context.contains("lac") {
        LAKH
    } else if context.contains('k') {
        1_000.0
    } else if value < 10.0 {
        // Very small bare number: almost certainly crores
        CRORE
    } else if value < 500.0 {
        LAKH
    } else {
        1.0
    }
}

/// Parse a budget utterance to (min, max) in rupees.
///
/// Returns `(None, None)` when no positive number can be found. Swaps the
/// bounds when a range arrives inverted.
pub fn parse_budget(budget_str: &str) -> (Option<u64>, Option<u64>) {
    let budget_lower = budget_str.to_lowercase();
    let budget_lower = budget_lower.trim();
    if budget_lower.is_empty() {
        return (None, None);
    }

    let stripped = HEDGING.replace_all(budget_lower, "");
    let stripped = WHITESPACE.replace_all(stripped.trim(), " ");

    // Thousands separators inside numbers
    let mut clean = stripped.to_string();
    loop {
        let next = COMMA_IN_NUMBER.replace_all(&clean, "$1$2").to_string();
        if next == clean {
            break;
        }
        clean = next;
    }

    let numbers: Vec<f64> = NUMBER
        .find_iter(&clean)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .collect();

    match numbers.len() {
        0 => (None, None),
        1 => {
            let max = numbers[0] * multiplier_for(numbers[0], &clean, false);
            let min = max * 0.7;
            (Some(min as u64), Some(max as u64))
        }
        _ => {
            let first = numbers[0] * multiplier_for(numbers[0], &clean, false);
            let second = numbers[1] * multiplier_for(numbers[1], &clean, true);
            let (min, max) = if first > second {
                (second, first)
            } else {
                (first, second)
            };
            (Some(min as u64), Some(max as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_becomes_ceiling_with_seventy_percent_floor() {
        assert_eq!(parse_budget("50 lakhs"), (Some(3_500_000), Some(5_000_000)));
        assert_eq!(parse_budget("1 crore"), (Some(7_000_000), Some(10_000_000)));
    }

    #[test]
    fn range_gets_per_side_multipliers() {
        assert_eq!(
            parse_budget("50 to 60 lakhs"),
            (Some(5_000_000), Some(6_000_000))
        );
        // Left side has its own unit
        assert_eq!(
            parse_budget("75 lakhs to 1 crore"),
            (Some(7_500_000), Some(10_000_000))
        );
    }

    #[test]
    fn inverted_range_is_swapped() {
        assert_eq!(
            parse_budget("2 crore to 90 lakhs"),
            (Some(9_000_000), Some(20_000_000))
        );
    }

    #[test]
    fn no_numbers_means_no_parse() {
        assert_eq!(parse_budget(""), (None, None));
        assert_eq!(parse_budget("flexible"), (None, None));
        assert_eq!(parse_budget("whatever you suggest"), (None, None));
    }

    #[test]
    fn hedging_words_are_ignored() {
        assert_eq!(
            parse_budget("around 50 lakhs maybe"),
            (Some(3_500_000), Some(5_000_000))
        );
    }

    #[test]
    fn comma_separated_absolute_numbers() {
        assert_eq!(
            parse_budget("75,00,000"),
            (Some(5_250_000), Some(7_500_000))
        );
    }

    #[test]
    fn magnitude_heuristic_for_bare_numbers() {
        // < 10 reads as crores
        assert_eq!(parse_budget("2"), (Some(14_000_000), Some(20_000_000)));
        // < 500 reads as lakhs
        assert_eq!(parse_budget("80"), (Some(5_600_000), Some(8_000_000)));
    }

    #[test]
    fn k_suffix() {
        assert_eq!(parse_budget("800k"), (Some(560_000), Some(800_000)));
    }

    #[test]
    fn hyphen_range() {
        assert_eq!(
            parse_budget("1-2 crore"),
            (Some(10_000_000), Some(20_000_000))
        );
    }

    #[test]
    fn non_positive_numbers_are_discarded() {
        assert_eq!(parse_budget("0"), (None, None));
    }
}
