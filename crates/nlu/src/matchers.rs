//! Per-slot deterministic matchers over curated variant tables
//!
//! Strategy shared by every matcher:
//! 1. substring hit of a known variant in the normalized utterance -> 0.95
//! 2. normalized edit similarity against every variant (whole utterance
//!    and per-word best), accepted at a matcher-specific threshold
//!
//! Spoken input arrives mangled ("noyda", "gurgram", "do bhk"), so the
//! tables carry misspellings and transliterated Hindi alongside the
//! canonical forms.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use lead_agent_core::PropertyCategory;

use crate::fuzzy::{pick_best, utterance_similarity, Scored};
use crate::normalize::normalize;

/// City variant table: canonical -> known spoken/misspelled forms
const CITY_VARIATIONS: &[(&str, &[&str])] = &[
    ("noida", &["noida", "noyda", "noeda", "naida", "noda", "nodia"]),
    (
        "greater noida",
        &["greater noida", "greater noyda", "big noida", "greater naida", "greaternoida"],
    ),
    (
        "greater noida west",
        &["greater noida west", "noida west", "noida extension", "gnw", "gaur city"],
    ),
    ("lucknow", &["lucknow", "lakhnou", "lakhnau", "lucnow", "luknow"]),
    (
        "gurugram",
        &["gurugram", "gurgaon", "gurugaon", "ggn", "gurgram", "gurugraam"],
    ),
    (
        "ghaziabad",
        &["ghaziabad", "gaziabad", "gzb", "gaziyabad", "ghaziabat"],
    ),
    ("pune", &["pune", "poona", "puna", "poone"]),
    ("thane", &["thane", "thana", "thaney", "tane"]),
    ("mumbai", &["mumbai", "bombay", "mumbay", "bambai", "mumby"]),
    (
        "navi mumbai",
        &["navi mumbai", "new mumbai", "new bombay", "navimumbai"],
    ),
    (
        "dehradun",
        &["dehradun", "dehradoon", "dehra dun", "dehradhun", "doon"],
    ),
    ("agra", &["agra", "aagra", "agara"]),
    (
        "vrindavan",
        &["vrindavan", "brindavan", "vrindaavan", "vrundavan", "mathura vrindavan"],
    ),
    ("delhi", &["delhi", "dilli", "new delhi", "deli", "dehli"]),
    (
        "varanasi",
        &["varanasi", "banaras", "benares", "kashi", "varanashi"],
    ),
    (
        "bengaluru",
        &["bengaluru", "bangalore", "banglore", "bangaluru", "blr"],
    ),
];

/// Mumbai localities that resolve to the metro at fixed confidence
const MUMBAI_AREAS: &[&str] = &[
    "andheri", "bandra", "malad", "goregaon", "powai", "worli", "borivali",
    "kandivali", "juhu", "khar", "santacruz", "versova", "lokhandwala",
    "oshiwara", "wadala", "dadar", "parel", "lower parel", "bkc", "kurla",
    "ghatkopar", "mulund", "vikhroli", "chembur", "colaba", "marine lines",
    "crawford market", "churchgate", "nariman point", "fort", "mahalaxmi",
];

const CATEGORY_VARIATIONS: &[(&str, &[&str])] = &[
    (
        "residential",
        &["residential", "resi", "home", "house", "flat", "apartment", "living", "stay", "residence"],
    ),
    (
        "commercial",
        &["commercial", "office", "shop", "business", "retail", "store", "workspace", "work space"],
    ),
];

const PROPERTY_TYPE_RESIDENTIAL: &[(&str, &[&str])] = &[
    (
        "Apartments",
        &["apartment", "flat", "flats", "appartment", "appt", "unit"],
    ),
    (
        "Villas",
        &["villa", "bungalow", "banglow", "independent house", "kothi", "farmhouse"],
    ),
    (
        "Residential Plots",
        &["plot", "land", "plat", "residential plot", "land plot"],
    ),
    (
        "Independent Floor",
        &["floor", "builder floor", "independent floor", "single floor"],
    ),
    (
        "Residential Studio",
        &["studio", "studio apartment", "bachelor pad", "single room"],
    ),
];

const PROPERTY_TYPES_COMMERCIAL: &[&str] = &[
    "Office Space",
    "Shop",
    "Commercial Plots",
    "Showrooms",
    "High Street Retail",
];

const BEDROOM_VARIATIONS: &[(&str, &[&str])] = &[
    (
        "1 BHK",
        &["1 bhk", "one bhk", "1bhk", "one bedroom", "1 bedroom", "single bhk", "ek bhk", "one bk", "1 bk"],
    ),
    (
        "2 BHK",
        &["2 bhk", "two bhk", "2bhk", "two bedroom", "2 bedroom", "do bhk", "two bk", "2 bk", "double bhk"],
    ),
    (
        "3 BHK",
        &["3 bhk", "three bhk", "3bhk", "three bedroom", "3 bedroom", "teen bhk", "three bk", "3 bk", "triple bhk"],
    ),
    (
        "4 BHK",
        &["4 bhk", "four bhk", "4bhk", "four bedroom", "4 bedroom", "char bhk", "four bk", "4 bk", "quad bhk"],
    ),
    (
        "5 BHK",
        &["5 bhk", "five bhk", "5bhk", "five bedroom", "5 bedroom", "paanch bhk", "five bk", "5 bk"],
    ),
    (
        "Studio",
        &["studio", "studio apartment", "single room", "bachelor", "1 room", "one room", "rk", "1rk"],
    ),
];

const CONSENT_YES: &[&str] = &[
    "yes", "yeah", "yep", "sure", "ok", "okay", "fine", "alright", "definitely",
    "absolutely", "please", "go ahead", "call me", "contact me", "haan", "ji", "thik hai",
];

const CONSENT_NO: &[&str] = &[
    "no", "nope", "nah", "not now", "later", "dont", "no thanks",
    "not interested", "nahi", "na", "mat karo", "baad mein",
];

/// Spelled-out numbers (English and transliterated Hindi) for bedroom counts
const WORD_NUMBERS: &[(&str, u8)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("ek", 1),
    ("do", 2),
    ("teen", 3),
    ("char", 4),
    ("paanch", 5),
];

/// Keywords that mark an utterance as information-dense, used by the
/// dialogue manager's rich-input shortcut
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "bhk", "bedroom", "flat", "apartment", "villa", "house", "plot",
    "office", "shop", "lakh", "crore", "budget", "noida", "mumbai",
    "delhi", "bangalore", "pune", "gurugram", "looking", "want", "need",
];

static BHK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:bhk|bk|bedroom|bed)").unwrap());

/// Title-case each whitespace-separated word
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Substring hit against a variant table, tie-broken by the shared rule
fn lookup_hit<'a>(speech_norm: &str, table: &'a [(&'a str, &'a [&'a str])]) -> Option<&'a str> {
    let hits = table.iter().flat_map(|(canonical, variants)| {
        variants.iter().filter_map(move |var| {
            speech_norm
                .contains(var)
                .then_some(Scored { canonical, variant: var, score: 0.95 })
        })
    });
    pick_best(hits).map(|s| s.canonical)
}

/// Best fuzzy score against a variant table
fn fuzzy_hit<'a>(
    speech_norm: &str,
    table: &'a [(&'a str, &'a [&'a str])],
    threshold: f32,
) -> Option<(&'a str, f32)> {
    let candidates = table.iter().flat_map(|(canonical, variants)| {
        variants.iter().map(move |var| Scored {
            canonical,
            variant: var,
            score: utterance_similarity(var, speech_norm),
        })
    });
    pick_best(candidates)
        .filter(|s| s.score >= threshold)
        .map(|s| (s.canonical, s.score))
}

/// Deterministic per-slot matcher over the curated tables.
///
/// Stateless; one instance can be shared across sessions.
#[derive(Debug, Default, Clone)]
pub struct SlotMatcher;

impl SlotMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Match a spoken city. Neighborhood names of a mapped metro resolve
    /// to the metro at fixed 0.9 before the generic tables run.
    pub fn match_city(&self, speech: &str) -> (Option<String>, f32) {
        let speech_norm = normalize(speech);
        if speech_norm.is_empty() {
            return (None, 0.0);
        }

        for area in MUMBAI_AREAS {
            if speech_norm.contains(area) {
                tracing::debug!(area, "matched metro sub-area");
                return (Some("Mumbai".to_string()), 0.9);
            }
        }

        if let Some(canonical) = lookup_hit(&speech_norm, CITY_VARIATIONS) {
            return (Some(title_case(canonical)), 0.95);
        }

        if let Some((canonical, score)) = fuzzy_hit(&speech_norm, CITY_VARIATIONS, 0.6) {
            return (Some(title_case(canonical)), score);
        }

        (None, 0.0)
    }

    /// Match a bedroom requirement to "N BHK" (N in 1..=5) or "Studio".
    pub fn match_bedroom(&self, speech: &str) -> (Option<String>, f32) {
        let speech_norm = normalize(speech);
        if speech_norm.is_empty() {
            return (None, 0.0);
        }

        // Explicit digit + bedroom keyword
        if let Some(caps) = BHK_PATTERN.captures(&speech_norm) {
            if let Ok(num) = caps[1].parse::<u8>() {
                if (1..=5).contains(&num) {
                    return (Some(format!("{num} BHK")), 0.95);
                }
            }
        }

        // Spelled-out number + bedroom keyword
        let has_bedroom_word = ["bhk", "bedroom", "bk"]
            .iter()
            .any(|kw| speech_norm.contains(kw));
        if has_bedroom_word {
            let words: Vec<&str> = speech_norm.unicode_words().collect();
            for (word, num) in WORD_NUMBERS {
                if words.contains(word) {
                    return (Some(format!("{num} BHK")), 0.9);
                }
            }
        }

        if let Some(canonical) = lookup_hit(&speech_norm, BEDROOM_VARIATIONS) {
            return (Some(canonical.to_string()), 0.9);
        }

        if let Some((canonical, _)) = fuzzy_hit(&speech_norm, BEDROOM_VARIATIONS, 0.5) {
            return (Some(canonical.to_string()), 0.7);
        }

        (None, 0.0)
    }

    /// Match the residential/commercial category.
    pub fn match_category(&self, speech: &str) -> (Option<PropertyCategory>, f32) {
        let speech_norm = normalize(speech);
        if speech_norm.is_empty() {
            return (None, 0.0);
        }

        let to_category = |canonical: &str| match canonical {
            "commercial" => PropertyCategory::Commercial,
            _ => PropertyCategory::Residential,
        };

        if let Some(canonical) = lookup_hit(&speech_norm, CATEGORY_VARIATIONS) {
            return (Some(to_category(canonical)), 0.95);
        }

        if let Some((canonical, _)) = fuzzy_hit(&speech_norm, CATEGORY_VARIATIONS, 0.6) {
            return (Some(to_category(canonical)), 0.8);
        }

        (None, 0.0)
    }

    /// Match a yes/no consent response.
    pub fn match_consent(&self, speech: &str) -> (Option<bool>, f32) {
        let speech_norm = normalize(speech);
        if speech_norm.is_empty() {
            return (None, 0.0);
        }

        // Single-word variants match on word boundaries so "no" never
        // fires inside "noida"; phrases match as substrings. Yes variants
        // are checked before no variants for mixed answers like
        // "yes but not now".
        let words: Vec<&str> = speech_norm.unicode_words().collect();
        let hit = |var: &str| {
            if var.contains(' ') {
                speech_norm.contains(var)
            } else {
                words.contains(&var)
            }
        };
        if CONSENT_YES.iter().any(|var| hit(var)) {
            return (Some(true), 0.95);
        }
        if CONSENT_NO.iter().any(|var| hit(var)) {
            return (Some(false), 0.95);
        }

        let yes_table: &[(&str, &[&str])] = &[("yes", CONSENT_YES)];
        if fuzzy_hit(&speech_norm, yes_table, 0.6).is_some() {
            return (Some(true), 0.7);
        }
        let no_table: &[(&str, &[&str])] = &[("no", CONSENT_NO)];
        if fuzzy_hit(&speech_norm, no_table, 0.6).is_some() {
            return (Some(false), 0.7);
        }

        (None, 0.0)
    }

    /// Match a property subtype within the captured category. Residential
    /// input that matches nothing still yields the weak "Apartments"
    /// default rather than a miss.
    pub fn match_property_type(
        &self,
        speech: &str,
        category: PropertyCategory,
    ) -> (Option<String>, f32) {
        let speech_norm = normalize(speech);

        if category == PropertyCategory::Commercial {
            for ptype in PROPERTY_TYPES_COMMERCIAL {
                if speech_norm.contains(&normalize(ptype)) {
                    return (Some(ptype.to_string()), 0.95);
                }
            }
            let candidates = PROPERTY_TYPES_COMMERCIAL.iter().map(|ptype| Scored {
                canonical: ptype,
                variant: ptype,
                score: utterance_similarity(&normalize(ptype), &speech_norm),
            });
            if let Some(best) = pick_best(candidates).filter(|s| s.score >= 0.5) {
                return (Some(best.canonical.to_string()), 0.7);
            }
            return (Some("Office Space".to_string()), 0.5);
        }

        for (canonical, _) in PROPERTY_TYPE_RESIDENTIAL {
            if speech_norm.contains(&normalize(canonical)) {
                return (Some(canonical.to_string()), 0.95);
            }
        }

        if let Some(canonical) = lookup_hit(&speech_norm, PROPERTY_TYPE_RESIDENTIAL) {
            return (Some(canonical.to_string()), 0.9);
        }

        if let Some((canonical, _)) = fuzzy_hit(&speech_norm, PROPERTY_TYPE_RESIDENTIAL, 0.5) {
            return (Some(canonical.to_string()), 0.7);
        }

        // Keyword nudges before the weak default
        if ["flat", "apartment", "building"].iter().any(|kw| speech_norm.contains(kw)) {
            return (Some("Apartments".to_string()), 0.6);
        }
        if ["house", "kothi", "bungalow"].iter().any(|kw| speech_norm.contains(kw)) {
            return (Some("Villas".to_string()), 0.6);
        }

        (Some("Apartments".to_string()), 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_exact_and_misspelled() {
        let m = SlotMatcher::new();
        let (city, conf) = m.match_city("Noida");
        assert_eq!(city.as_deref(), Some("Noida"));
        assert_eq!(conf, 0.95);

        let (city, conf) = m.match_city("I am looking in noyda");
        assert_eq!(city.as_deref(), Some("Noida"));
        assert_eq!(conf, 0.95);

        let (city, _) = m.match_city("gurgaon side");
        assert_eq!(city.as_deref(), Some("Gurugram"));
    }

    #[test]
    fn city_sub_area_maps_to_metro_at_fixed_confidence() {
        let m = SlotMatcher::new();
        let (city, conf) = m.match_city("somewhere near Andheri maybe");
        assert_eq!(city.as_deref(), Some("Mumbai"));
        assert_eq!(conf, 0.9);
    }

    #[test]
    fn city_fuzzy_fallback() {
        let m = SlotMatcher::new();
        // One edit away from "noida" without containing any variant
        let (city, conf) = m.match_city("noidda");
        assert_eq!(city.as_deref(), Some("Noida"));
        assert!(conf >= 0.6 && conf < 0.95);
    }

    #[test]
    fn city_garbage_is_a_miss() {
        let m = SlotMatcher::new();
        let (city, conf) = m.match_city("xyzzy quux");
        assert_eq!(city, None);
        assert_eq!(conf, 0.0);
    }

    #[test]
    fn bedroom_digit_word_and_hindi_forms() {
        let m = SlotMatcher::new();
        for input in ["2bhk", "two bedroom", "do bhk"] {
            let (bedroom, conf) = m.match_bedroom(input);
            assert_eq!(bedroom.as_deref(), Some("2 BHK"), "input: {input}");
            assert!(conf >= 0.9, "input: {input}");
        }
    }

    #[test]
    fn bedroom_out_of_range_rejected_by_digit_path() {
        let m = SlotMatcher::new();
        let (bedroom, _) = m.match_bedroom("9 bhk");
        // Digit path rejects 9; nothing else in the tables says 9
        assert_ne!(bedroom.as_deref(), Some("9 BHK"));
    }

    #[test]
    fn bedroom_studio() {
        let m = SlotMatcher::new();
        let (bedroom, conf) = m.match_bedroom("just a studio apartment");
        assert_eq!(bedroom.as_deref(), Some("Studio"));
        assert!(conf >= 0.9);
    }

    #[test]
    fn category_two_classes() {
        let m = SlotMatcher::new();
        let (cat, conf) = m.match_category("residential please");
        assert_eq!(cat, Some(PropertyCategory::Residential));
        assert_eq!(conf, 0.95);

        let (cat, _) = m.match_category("need an office");
        assert_eq!(cat, Some(PropertyCategory::Commercial));
    }

    #[test]
    fn consent_hindi_variants() {
        let m = SlotMatcher::new();
        assert_eq!(m.match_consent("haan ji").0, Some(true));
        assert_eq!(m.match_consent("nahi").0, Some(false));
        assert_eq!(m.match_consent("hmm").0, None);
    }

    #[test]
    fn consent_variants_do_not_fire_inside_other_words() {
        let m = SlotMatcher::new();
        // "no" must not match inside "noida"
        assert_eq!(m.match_consent("noida").0, None);
        assert_eq!(m.match_consent("yes but not now").0, Some(true));
    }

    #[test]
    fn property_type_residential_vocabulary() {
        let m = SlotMatcher::new();
        let (ptype, conf) = m.match_property_type("a flat", PropertyCategory::Residential);
        assert_eq!(ptype.as_deref(), Some("Apartments"));
        assert!(conf >= 0.9);

        let (ptype, _) = m.match_property_type("independent house", PropertyCategory::Residential);
        assert_eq!(ptype.as_deref(), Some("Villas"));
    }

    #[test]
    fn property_type_defaults_weakly_to_apartments() {
        let m = SlotMatcher::new();
        let (ptype, conf) = m.match_property_type("whatever works", PropertyCategory::Residential);
        assert_eq!(ptype.as_deref(), Some("Apartments"));
        assert_eq!(conf, 0.5);
    }

    #[test]
    fn property_type_commercial_vocabulary() {
        let m = SlotMatcher::new();
        let (ptype, conf) = m.match_property_type("office space", PropertyCategory::Commercial);
        assert_eq!(ptype.as_deref(), Some("Office Space"));
        assert_eq!(conf, 0.95);
    }
}
