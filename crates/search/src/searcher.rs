//! Property searcher implementations

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use lead_agent_config::SearchSettings;

use crate::types::{SearchOutcome, SearchQuery};
use crate::url::build_search_url;
use crate::SearchError;

/// Search collaborator the dialogue manager calls once per session.
///
/// Implementations never return an error: failures come back as an
/// outcome with `success = false` and zero matches.
#[async_trait]
pub trait PropertySearcher: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> SearchOutcome;
}

/// Match-count patterns seen on listing result pages
static COUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(\d+)\s*(?:Properties|Results)\s*(?:Found|found)?").unwrap(),
        Regex::new(r"Showing\s*\d+\s*-\s*\d+\s*of\s*(\d+)").unwrap(),
    ]
});

/// Live searcher against the listing site
pub struct HttpPropertySearcher {
    client: Client,
    base_url: String,
}

impl HttpPropertySearcher {
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    fn extract_count(body: &str) -> Option<u32> {
        for pattern in COUNT_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(body) {
                if let Ok(count) = caps[1].parse() {
                    return Some(count);
                }
            }
        }
        None
    }

    async fn fetch(&self, url: &str) -> Result<String, SearchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Network(format!(
                "listing site returned {}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PropertySearcher for HttpPropertySearcher {
    async fn search(&self, query: &SearchQuery) -> SearchOutcome {
        let url = build_search_url(&self.base_url, query);
        tracing::info!(%url, "searching listings");

        match self.fetch(&url).await {
            Ok(body) => match Self::extract_count(&body) {
                Some(count) => SearchOutcome {
                    count,
                    top_results: Vec::new(),
                    success: true,
                    error: None,
                    source_url: url,
                },
                None => {
                    tracing::warn!(%url, "no match count on listing page");
                    SearchOutcome::failure("unparseable listing page", url)
                }
            },
            Err(err) => {
                tracing::warn!(%url, error = %err, "search request failed");
                SearchOutcome::failure(err.to_string(), url)
            }
        }
    }
}

/// Canned searcher for tests and offline runs
#[derive(Debug, Clone)]
pub struct FixedSearcher {
    outcome: SearchOutcome,
}

impl FixedSearcher {
    pub fn new(outcome: SearchOutcome) -> Self {
        Self { outcome }
    }

    /// Successful outcome with the given count and no listings
    pub fn with_count(count: u32) -> Self {
        Self::new(SearchOutcome {
            count,
            top_results: Vec::new(),
            success: true,
            error: None,
            source_url: String::new(),
        })
    }
}

#[async_trait]
impl PropertySearcher for FixedSearcher {
    async fn search(&self, _query: &SearchQuery) -> SearchOutcome {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_agent_core::PropertyCategory;

    #[test]
    fn count_extraction_patterns() {
        assert_eq!(
            HttpPropertySearcher::extract_count("<h2>42 Properties Found</h2>"),
            Some(42)
        );
        assert_eq!(
            HttpPropertySearcher::extract_count("Showing 1 - 20 of 135"),
            Some(135)
        );
        assert_eq!(
            HttpPropertySearcher::extract_count("<p>no results here</p>"),
            None
        );
    }

    #[tokio::test]
    async fn fixed_searcher_replays_outcome() {
        let searcher = FixedSearcher::with_count(7);
        let outcome = searcher
            .search(&SearchQuery {
                location: "Noida".to_string(),
                category: PropertyCategory::Residential,
                property_type: None,
                bedroom: None,
            })
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.count, 7);
    }
}
