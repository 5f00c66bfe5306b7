//! Normalized edit similarity with an explicit tie-break rule
//!
//! Similarity is `1 - levenshtein(a, b) / max(len_a, len_b)` over chars.
//! When several candidates score equally, the longer variant string wins;
//! equal lengths fall back to the lexicographically smaller canonical.
//! Tie-breaking is a stated rule here, not an accident of table order.

/// Levenshtein distance over chars, two-row rolling buffer
pub fn levenshtein(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row: Vec<usize> = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            curr_row[j] = std::cmp::min(
                std::cmp::min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Normalized edit similarity in [0, 1]. Both inputs are expected to be
/// normalized already.
pub fn similarity(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f32 / max_len as f32
}

/// Similarity of a variant against a full utterance: the better of the
/// whole-utterance score and the best per-word score, so a city name
/// buried in extra words still matches.
pub fn utterance_similarity(variant: &str, utterance: &str) -> f32 {
    let mut best = similarity(variant, utterance);
    for word in utterance.split_whitespace() {
        best = best.max(similarity(variant, word));
    }
    best
}

/// A scored candidate during table matching
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<'a> {
    pub canonical: &'a str,
    pub variant: &'a str,
    pub score: f32,
}

/// Pick the best candidate under the documented tie-break: higher score,
/// then longer variant, then lexicographically smaller canonical.
pub fn pick_best<'a>(candidates: impl IntoIterator<Item = Scored<'a>>) -> Option<Scored<'a>> {
    let mut best: Option<Scored<'a>> = None;
    for cand in candidates {
        match &best {
            None => best = Some(cand),
            Some(cur) => {
                let wins = cand.score > cur.score
                    || (cand.score == cur.score && cand.variant.len() > cur.variant.len())
                    || (cand.score == cur.score
                        && cand.variant.len() == cur.variant.len()
                        && cand.canonical < cur.canonical);
                if wins {
                    best = Some(cand);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("noida", "noyda"), 1);
    }

    #[test]
    fn similarity_range() {
        assert_eq!(similarity("noida", "noida"), 1.0);
        assert!(similarity("noida", "noyda") >= 0.8);
        assert!(similarity("noida", "kolkata") < 0.5);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn per_word_similarity_survives_extra_words() {
        let whole = similarity("noida", "i want a flat in noyda please");
        let per_word = utterance_similarity("noida", "i want a flat in noyda please");
        assert!(per_word > whole);
        assert!(per_word >= 0.8);
    }

    #[test]
    fn tie_break_prefers_longer_variant_then_smaller_canonical() {
        let candidates = vec![
            Scored { canonical: "pune", variant: "puna", score: 0.75 },
            Scored { canonical: "thane", variant: "thaney", score: 0.75 },
        ];
        // Same score; "thaney" is longer than "puna"
        let best = pick_best(candidates).unwrap();
        assert_eq!(best.canonical, "thane");

        let candidates = vec![
            Scored { canonical: "zeta", variant: "abcd", score: 0.5 },
            Scored { canonical: "alpha", variant: "wxyz", score: 0.5 },
        ];
        // Same score, same variant length; smaller canonical wins
        let best = pick_best(candidates).unwrap();
        assert_eq!(best.canonical, "alpha");
    }

    #[test]
    fn higher_score_always_wins() {
        let candidates = vec![
            Scored { canonical: "a", variant: "long variant", score: 0.6 },
            Scored { canonical: "b", variant: "x", score: 0.9 },
        ];
        assert_eq!(pick_best(candidates).unwrap().canonical, "b");
    }
}
