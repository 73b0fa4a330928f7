//! Optional liveness check for citation links.

use crate::model::Citation;
use crate::urls::scholar_search_url;
use async_trait::async_trait;
use nofake_common::{NofakeError, Result};
use nofake_http::HttpClient;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait LinkChecker: Send + Sync {
    /// `true` when `url` answers; errors count as unreachable.
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Probes links with a single `HEAD` request each.
#[derive(Clone)]
pub struct HttpLinkChecker {
    client: HttpClient,
}

impl HttpLinkChecker {
    pub fn new() -> Result<Self> {
        // Probes always use absolute URLs; the base is never joined.
        let client = HttpClient::new("https://doi.org/")
            .map_err(|e| NofakeError::Config(e.to_string()))?
            .with_timeout(PROBE_TIMEOUT)
            .with_retries(0);
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkChecker for HttpLinkChecker {
    async fn is_reachable(&self, url: &str) -> bool {
        self.client.probe(url).await
    }
}

/// Replace every unreachable citation URL with a Scholar search for its
/// title. Returns how many links were replaced.
pub async fn replace_dead_links(checker: &dyn LinkChecker, citations: &mut [Citation]) -> usize {
    let mut replaced = 0;
    for citation in citations.iter_mut() {
        if checker.is_reachable(&citation.url).await {
            continue;
        }
        tracing::debug!(url = %citation.url, "citations.link.dead");
        citation.url = scholar_search_url(&citation.title);
        replaced += 1;
    }
    replaced
}
