//! Text canonicalization
//!
//! Every matcher operates on normalized text: lowercased, diacritics
//! folded to their base letter, punctuation removed, whitespace collapsed.
//! The function is total and idempotent.

/// Fold a single character to its undecorated lowercase base.
///
/// Covers the Latin accented range seen in transcribed speech plus
/// combining marks, which are dropped outright. Characters outside the
/// table pass through unchanged.
fn fold_char(c: char) -> Option<char> {
    // Combining diacritical marks
    if ('\u{0300}'..='\u{036F}').contains(&c) {
        return None;
    }
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ĭ' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' => 'o',
        'ś' | 'š' => 's',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ŭ' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        other => other,
    };
    Some(folded)
}

/// Normalize text for matching.
///
/// Lowercase, fold diacritics, strip punctuation, collapse whitespace,
/// trim. `normalize(normalize(x)) == normalize(x)` for all inputs.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true; // leading whitespace is dropped

    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        let Some(c) = fold_char(c) else { continue };
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else if c.is_alphanumeric() || c == '_' {
            out.push(c);
            last_was_space = false;
        }
        // everything else is punctuation, dropped
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Noida  "), "noida");
    }

    #[test]
    fn strips_punctuation_keeps_internal_spaces() {
        assert_eq!(normalize("Yes, 2 B.H.K. please!"), "yes 2 bhk please");
    }

    #[test]
    fn folds_diacritics() {
        assert_eq!(normalize("Noidā"), "noida");
        assert_eq!(normalize("Püné"), "pune");
    }

    #[test]
    fn drops_combining_marks() {
        // "noida" with a combining acute accent on the i
        assert_eq!(normalize("noi\u{0301}da"), "noida");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("greater\t \n noida"), "greater noida");
    }

    #[test]
    fn idempotent() {
        for input in [
            "  Héllo,   WORLD!! ",
            "2BHK in Noidā",
            "",
            "   ",
            "already normalized text",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn empty_and_punctuation_only_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!.,"), "");
    }
}
