//! Search-engine integration for the FAQ corpus.
//!
//! [`SearchStore`] is the narrow seam the pipeline depends on;
//! [`ElasticClient`] implements it against the Elasticsearch REST API with a
//! fixed schema: three free-text fields plus an exact-match course keyword.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use faqpilot_shared::{FaqPilotError, IndexedFaqRecord, Result};

/// User-Agent string for search-engine requests.
const USER_AGENT: &str = concat!("faqpilot/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// SearchStore trait
// ---------------------------------------------------------------------------

/// Narrow seam between the pipeline and the search engine.
///
/// Append-only by design: records are indexed once and never updated or
/// deleted individually.
pub trait SearchStore: Send + Sync {
    /// Provision the index with the FAQ schema. Errors if it already exists.
    fn create_index(&self) -> impl Future<Output = Result<()>> + Send;

    /// Drop the whole index. A missing index is not an error.
    fn delete_index(&self) -> impl Future<Output = Result<()>> + Send;

    /// Write one record.
    fn index_record(&self, record: &IndexedFaqRecord)
    -> impl Future<Output = Result<()>> + Send;

    /// Ranked multi-field match filtered to an exact course, top `k` records
    /// in engine rank order.
    fn search(
        &self,
        query: &str,
        course: &str,
        k: usize,
    ) -> impl Future<Output = Result<Vec<IndexedFaqRecord>>> + Send;
}

// ---------------------------------------------------------------------------
// Elasticsearch client
// ---------------------------------------------------------------------------

/// Thin client for the Elasticsearch REST API.
pub struct ElasticClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

impl ElasticClient {
    /// Create a client for `index` on the engine at `base_url`.
    pub fn new(base_url: impl Into<String>, index: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FaqPilotError::Query(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            index: index.into(),
        })
    }

    /// The index this client reads and writes.
    pub fn index_name(&self) -> &str {
        &self.index
    }
}

impl SearchStore for ElasticClient {
    async fn create_index(&self) -> Result<()> {
        let url = format!("{}/{}", self.base_url, self.index);
        let body = json!({
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 0
            },
            "mappings": {
                "properties": {
                    "text": {"type": "text"},
                    "section": {"type": "text"},
                    "question": {"type": "text"},
                    "course": {"type": "keyword"}
                }
            }
        });

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FaqPilotError::IndexProvision(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FaqPilotError::IndexProvision(format!(
                "{}: HTTP {status}: {detail}",
                self.index
            )));
        }

        debug!(index = %self.index, "index created");
        Ok(())
    }

    async fn delete_index(&self) -> Result<()> {
        let url = format!("{}/{}", self.base_url, self.index);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| FaqPilotError::IndexProvision(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let detail = response.text().await.unwrap_or_default();
            return Err(FaqPilotError::IndexProvision(format!(
                "{}: HTTP {status}: {detail}",
                self.index
            )));
        }

        debug!(index = %self.index, "index deleted");
        Ok(())
    }

    async fn index_record(&self, record: &IndexedFaqRecord) -> Result<()> {
        let url = format!("{}/{}/_doc", self.base_url, self.index);

        let response = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| FaqPilotError::IndexWrite(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FaqPilotError::IndexWrite(format!(
                "HTTP {status}: {detail}"
            )));
        }

        Ok(())
    }

    async fn search(&self, query: &str, course: &str, k: usize) -> Result<Vec<IndexedFaqRecord>> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let body = build_search_body(query, course, k);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FaqPilotError::Query(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FaqPilotError::Query(format!("HTTP {status}: {detail}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| FaqPilotError::Query(format!("malformed search response: {e}")))?;

        let records: Vec<IndexedFaqRecord> =
            parsed.hits.hits.into_iter().map(|hit| hit.source).collect();

        debug!(hits = records.len(), course, "search complete");
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Query DSL
// ---------------------------------------------------------------------------

/// The ranked query body: question matches weighted 3x over text and
/// section, hard-filtered to one course keyword.
fn build_search_body(query: &str, course: &str, k: usize) -> serde_json::Value {
    json!({
        "size": k,
        "query": {
            "bool": {
                "must": {
                    "multi_match": {
                        "query": query,
                        "fields": ["question^3", "text", "section"],
                        "type": "best_fields"
                    }
                },
                "filter": {
                    "term": {
                        "course": course
                    }
                }
            }
        }
    })
}

/// Engine response envelope; only the source documents matter here.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: IndexedFaqRecord,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
