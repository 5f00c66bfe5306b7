//! Listing-site search URL construction
//!
//! Mirrors the site's search form: numeric city ids, category 1
//! (Residential) / 4 (Commercial), subtype and bedroom parameters.

use once_cell::sync::Lazy;
use regex::Regex;

use lead_agent_core::PropertyCategory;

use crate::types::SearchQuery;

/// City ids used by the listing site's search form. Localities of a metro
/// share the metro's id.
const CITY_IDS: &[(&str, u32)] = &[
    ("noida", 10),
    ("greater noida", 5),
    ("greater noida west", 21),
    ("lucknow", 6),
    ("gurugram", 9),
    ("gurgaon", 9),
    ("ghaziabad", 16),
    ("pune", 8),
    ("thane", 17),
    ("mumbai", 1),
    ("navi mumbai", 11),
    ("dehradun", 18),
    ("agra", 19),
    ("vrindavan", 20),
    ("delhi", 4),
    ("varanasi", 15),
    ("bengaluru", 2),
    ("bangalore", 2),
    ("andheri", 1),
    ("bandra", 1),
    ("malad", 1),
    ("goregaon", 1),
    ("powai", 1),
    ("worli", 1),
    ("borivali", 1),
    ("kandivali", 1),
    ("juhu", 1),
    ("kurla", 1),
];

static BHK_IN_TOPOLOGY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*bhk").unwrap());

/// City id for a free-form location string. Longer city names are tried
/// first so "greater noida west" never resolves to plain "noida".
pub fn city_id(location: &str) -> Option<u32> {
    let location_lower = location.to_lowercase();
    let mut cities: Vec<&(&str, u32)> = CITY_IDS.iter().collect();
    cities.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    cities
        .iter()
        .find(|(city, _)| location_lower.contains(city))
        .map(|(_, id)| *id)
}

fn subtype_param(category: PropertyCategory, property_type: &str) -> Option<&'static str> {
    let ptype = property_type.to_lowercase();
    match category {
        PropertyCategory::Commercial => {
            if ptype.contains("shop") {
                Some("Shop")
            } else if ptype.contains("office") {
                Some("Office Space")
            } else if ptype.contains("plot") {
                Some("Commercial Plot")
            } else {
                None
            }
        }
        PropertyCategory::Residential => {
            if ptype.contains("villa") {
                Some("Villas")
            } else if ptype.contains("plot") {
                Some("Residential Plots")
            } else if ptype.contains("floor") || ptype.contains("independent") {
                Some("Independent Floor")
            } else if ptype.contains("studio") {
                Some("Residential Studio")
            } else {
                Some("Apartments")
            }
        }
    }
}

fn bedroom_param(topology: &str) -> Option<String> {
    let topology_lower = topology.to_lowercase();
    if let Some(caps) = BHK_IN_TOPOLOGY.captures(&topology_lower) {
        let num: u32 = caps[1].parse().ok()?;
        return Some(format!("{} BHK", num.min(5)));
    }
    if topology_lower.contains("studio") {
        return Some("Studio".to_string());
    }
    None
}

fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Build the full search URL for a query.
pub fn build_search_url(base_url: &str, query: &SearchQuery) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if let Some(id) = city_id(&query.location) {
        params.push(("city", id.to_string()));
    }

    let category_id = match query.category {
        PropertyCategory::Residential => 1,
        PropertyCategory::Commercial => 4,
    };
    params.push(("property_category", category_id.to_string()));

    if let Some(ptype) = query
        .property_type
        .as_deref()
        .and_then(|p| subtype_param(query.category, p))
    {
        params.push(("property_type", ptype.to_string()));
    } else if query.category == PropertyCategory::Residential {
        params.push(("property_type", "Apartments".to_string()));
    }

    if let Some(bedroom) = query.bedroom.as_deref().and_then(bedroom_param) {
        params.push(("bedroom", bedroom));
    }

    params.push(("submit", "Search".to_string()));

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}/properties?{query_string}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential_query() -> SearchQuery {
        SearchQuery {
            location: "Noida".to_string(),
            category: PropertyCategory::Residential,
            property_type: Some("Apartments".to_string()),
            bedroom: Some("2 BHK".to_string()),
        }
    }

    #[test]
    fn residential_url_carries_all_params() {
        let url = build_search_url("https://example.com", &residential_query());
        assert!(url.starts_with("https://example.com/properties?"));
        assert!(url.contains("city=10"));
        assert!(url.contains("property_category=1"));
        assert!(url.contains("property_type=Apartments"));
        assert!(url.contains("bedroom=2+BHK"));
        assert!(url.contains("submit=Search"));
    }

    #[test]
    fn longest_city_name_wins() {
        assert_eq!(city_id("greater noida west"), Some(21));
        assert_eq!(city_id("greater noida"), Some(5));
        assert_eq!(city_id("noida sector 62"), Some(10));
    }

    #[test]
    fn metro_locality_shares_metro_id() {
        assert_eq!(city_id("Andheri"), Some(1));
        assert_eq!(city_id("mumbai"), Some(1));
    }

    #[test]
    fn unknown_city_omits_the_param() {
        let mut query = residential_query();
        query.location = "Atlantis".to_string();
        let url = build_search_url("https://example.com", &query);
        assert!(!url.contains("city="));
    }

    #[test]
    fn commercial_category_and_subtype() {
        let query = SearchQuery {
            location: "Mumbai".to_string(),
            category: PropertyCategory::Commercial,
            property_type: Some("Office Space".to_string()),
            bedroom: None,
        };
        let url = build_search_url("https://example.com", &query);
        assert!(url.contains("property_category=4"));
        assert!(url.contains("property_type=Office+Space"));
        assert!(!url.contains("bedroom="));
    }

    #[test]
    fn bedroom_clamps_above_five() {
        assert_eq!(bedroom_param("7 bhk"), Some("5 BHK".to_string()));
        assert_eq!(bedroom_param("studio"), Some("Studio".to_string()));
        assert_eq!(bedroom_param("whatever"), None);
    }
}
