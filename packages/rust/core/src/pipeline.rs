//! End-to-end pipelines: documents → corpus, corpus → index, question → answer.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use url::Url;

use faqpilot_extractor::ExtractOptions;
use faqpilot_llm::CompletionProvider;
use faqpilot_search::SearchStore;
use faqpilot_shared::{CourseDocuments, FaqPilotError, IndexedFaqRecord, Result, SourceEntry};

use crate::{context, corpus};

/// Export endpoint of the remote document store.
pub const DOCS_EXPORT_BASE: &str = "https://docs.google.com";

/// User-Agent string for document fetches.
const USER_AGENT: &str = concat!("faqpilot/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when one course's document has been fetched and parsed.
    fn course_done(&self, course: &str, records: usize, current: usize, total: usize);
    /// Called after each record lands in the index.
    fn record_indexed(&self, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn course_done(&self, _course: &str, _records: usize, _current: usize, _total: usize) {}
    fn record_indexed(&self, _current: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Extract
// ---------------------------------------------------------------------------

/// Configuration for the `extract` pipeline.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Courses to extract, in corpus order.
    pub sources: Vec<SourceEntry>,
    /// Where the corpus JSON is written.
    pub output_path: PathBuf,
    /// Base URL of the document store's export endpoint.
    pub export_base_url: String,
}

/// Result of the `extract` pipeline.
#[derive(Debug)]
pub struct ExtractResult {
    /// Path of the written corpus file.
    pub output_path: PathBuf,
    /// Courses successfully extracted.
    pub course_count: usize,
    /// Records across all extracted courses.
    pub record_count: usize,
    /// Courses that failed and were skipped.
    pub failed_courses: Vec<String>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run the full `extract` pipeline.
///
/// 1. Fetch each course's document export
/// 2. Decode and parse into FAQ records
/// 3. Write the corpus file
///
/// A failing course is logged and skipped; the pipeline errors only when no
/// course could be extracted.
#[instrument(skip_all, fields(courses = config.sources.len()))]
pub async fn extract_corpus(
    config: &ExtractConfig,
    progress: &dyn ProgressReporter,
) -> Result<ExtractResult> {
    let start = Instant::now();
    info!(courses = config.sources.len(), "starting corpus extraction");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| FaqPilotError::Fetch(format!("client build: {e}")))?;

    // --- Phase 1: Fetch and parse ---
    progress.phase("Fetching course documents");
    let mut groups: Vec<CourseDocuments> = Vec::new();
    let mut failed_courses: Vec<String> = Vec::new();
    let total = config.sources.len();

    for (i, source) in config.sources.iter().enumerate() {
        match pull_course(&client, &config.export_base_url, source).await {
            Ok(group) => {
                progress.course_done(&source.course, group.documents.len(), i + 1, total);
                groups.push(group);
            }
            Err(e) => {
                warn!(course = %source.course, error = %e, "course extraction failed, skipping");
                failed_courses.push(source.course.clone());
            }
        }
    }

    if groups.is_empty() {
        return Err(FaqPilotError::validation(
            "no course documents could be extracted",
        ));
    }

    // --- Phase 2: Write corpus ---
    progress.phase("Writing corpus");
    corpus::save_corpus(&config.output_path, &groups)?;

    let result = ExtractResult {
        output_path: config.output_path.clone(),
        course_count: groups.len(),
        record_count: groups.iter().map(|g| g.documents.len()).sum(),
        failed_courses,
        elapsed: start.elapsed(),
    };

    info!(
        courses = result.course_count,
        records = result.record_count,
        failed = result.failed_courses.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "extraction complete"
    );

    Ok(result)
}

/// Fetch, decode, and parse one course document.
async fn pull_course(
    client: &reqwest::Client,
    export_base_url: &str,
    source: &SourceEntry,
) -> Result<CourseDocuments> {
    let url = export_url(export_base_url, &source.file_id)?;
    let bytes = fetch_document(client, &url).await?;
    let paragraphs = faqpilot_extractor::decode_paragraphs(&bytes)?;
    let documents = faqpilot_extractor::extract_records(&paragraphs, &ExtractOptions::default());

    info!(course = %source.course, records = documents.len(), "course parsed");

    Ok(CourseDocuments {
        course: source.course.clone(),
        documents,
    })
}

/// Export URL for one document id.
fn export_url(base: &str, file_id: &str) -> Result<Url> {
    let raw = format!(
        "{}/document/d/{file_id}/export?format=docx",
        base.trim_end_matches('/')
    );
    Url::parse(&raw).map_err(|e| FaqPilotError::Fetch(format!("{raw}: {e}")))
}

/// Fetch a binary document container via HTTP.
async fn fetch_document(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| FaqPilotError::Fetch(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FaqPilotError::Fetch(format!("{url}: HTTP {status}")));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FaqPilotError::Fetch(format!("{url}: {e}")))?;

    Ok(bytes.to_vec())
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Configuration for the `index` pipeline.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Corpus file to load.
    pub input_path: PathBuf,
    /// Delete any existing index before provisioning.
    pub recreate: bool,
}

/// Result of the `index` pipeline.
#[derive(Debug)]
pub struct IndexResult {
    /// Records written to the index.
    pub record_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run the full `index` pipeline: load the corpus, provision the index,
/// write every record in order. Any rejected write aborts the run.
#[instrument(skip_all, fields(recreate = config.recreate))]
pub async fn index_corpus(
    config: &IndexConfig,
    store: &impl SearchStore,
    progress: &dyn ProgressReporter,
) -> Result<IndexResult> {
    let start = Instant::now();

    progress.phase("Loading corpus");
    let groups = corpus::load_corpus(&config.input_path)?;
    let records = corpus::flatten_corpus(groups);
    info!(records = records.len(), "corpus loaded");

    if config.recreate {
        progress.phase("Recreating index");
        store.delete_index().await?;
    } else {
        progress.phase("Creating index");
    }
    store.create_index().await?;

    progress.phase("Indexing records");
    let total = records.len();
    for (i, record) in records.iter().enumerate() {
        store.index_record(record).await?;
        progress.record_indexed(i + 1, total);
    }

    let result = IndexResult {
        record_count: total,
        elapsed: start.elapsed(),
    };

    info!(
        records = result.record_count,
        elapsed_ms = result.elapsed.as_millis(),
        "indexing complete"
    );

    Ok(result)
}

// ---------------------------------------------------------------------------
// Ask
// ---------------------------------------------------------------------------

/// Configuration for the `ask` pipeline.
#[derive(Debug, Clone)]
pub struct AskConfig {
    /// The user's question.
    pub question: String,
    /// Course the search is filtered to.
    pub course: String,
    /// How many retrieved records feed the context.
    pub top_k: usize,
}

/// Result of the `ask` pipeline.
#[derive(Debug)]
pub struct AskResult {
    /// The model's answer text, returned verbatim.
    pub answer: String,
    /// Records the answer was grounded on, in rank order.
    pub retrieved: Vec<IndexedFaqRecord>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run the full `ask` pipeline: search, assemble context and prompt, complete.
///
/// Zero hits is not an error; the model is asked with an empty context block.
#[instrument(skip_all, fields(course = %config.course, top_k = config.top_k))]
pub async fn answer_question(
    config: &AskConfig,
    store: &impl SearchStore,
    provider: &impl CompletionProvider,
    progress: &dyn ProgressReporter,
) -> Result<AskResult> {
    let start = Instant::now();

    progress.phase("Searching the FAQ index");
    let retrieved = store
        .search(&config.question, &config.course, config.top_k)
        .await?;
    info!(hits = retrieved.len(), "retrieval complete");

    progress.phase("Generating answer");
    let context = context::build_context(&retrieved);
    let prompt = context::build_prompt(&config.question, &context);
    let answer = provider.complete(&prompt).await?;

    let result = AskResult {
        answer,
        retrieved,
        elapsed: start.elapsed(),
    };

    info!(elapsed_ms = result.elapsed.as_millis(), "answer generated");

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use docx_rs::{Docx, Paragraph, Run, Style, StyleType};

    use faqpilot_shared::FaqRecord;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("faqpilot-pipeline-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn faq_docx(section: &str, entries: &[(&str, &str)]) -> Vec<u8> {
        let mut docx = Docx::new()
            .add_style(Style::new("Heading1", StyleType::Paragraph).name("heading 1"))
            .add_style(Style::new("Heading2", StyleType::Paragraph).name("heading 2"))
            .add_paragraph(
                Paragraph::new()
                    .style("Heading1")
                    .add_run(Run::new().add_text(section)),
            );
        for (question, answer) in entries {
            docx = docx
                .add_paragraph(
                    Paragraph::new()
                        .style("Heading2")
                        .add_run(Run::new().add_text(*question)),
                )
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text(*answer)));
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).expect("pack docx");
        buf.into_inner()
    }

    fn faq_record(question: &str) -> FaqRecord {
        FaqRecord {
            text: "Run docker compose up.".into(),
            section: "Module 1".into(),
            question: question.into(),
        }
    }

    fn indexed_record(section: &str, question: &str, text: &str) -> IndexedFaqRecord {
        IndexedFaqRecord {
            text: text.into(),
            section: section.into(),
            question: question.into(),
            course: "data-engineering-zoomcamp".into(),
        }
    }

    // --- Test doubles ---

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<&'static str>>,
        indexed: Mutex<Vec<IndexedFaqRecord>>,
        results: Vec<IndexedFaqRecord>,
        fail_after: Option<usize>,
        fail_search: bool,
    }

    impl SearchStore for RecordingStore {
        async fn create_index(&self) -> Result<()> {
            self.calls.lock().unwrap().push("create");
            Ok(())
        }

        async fn delete_index(&self) -> Result<()> {
            self.calls.lock().unwrap().push("delete");
            Ok(())
        }

        async fn index_record(&self, record: &IndexedFaqRecord) -> Result<()> {
            let mut indexed = self.indexed.lock().unwrap();
            if self.fail_after.is_some_and(|limit| indexed.len() >= limit) {
                return Err(FaqPilotError::IndexWrite("engine rejected write".into()));
            }
            indexed.push(record.clone());
            Ok(())
        }

        async fn search(
            &self,
            _query: &str,
            _course: &str,
            _k: usize,
        ) -> Result<Vec<IndexedFaqRecord>> {
            self.calls.lock().unwrap().push("search");
            if self.fail_search {
                return Err(FaqPilotError::Query("engine unreachable".into()));
            }
            Ok(self.results.clone())
        }
    }

    struct CannedCompletion {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedCompletion {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionProvider for CannedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    // --- Extract ---

    #[test]
    fn export_url_matches_document_store_layout() {
        let url = export_url(DOCS_EXPORT_BASE, "19bnYs80Dw").unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/document/d/19bnYs80Dw/export?format=docx"
        );
    }

    #[tokio::test]
    async fn fetch_document_rejects_http_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = Url::parse(&format!("{}/document/d/x/export?format=docx", server.uri())).unwrap();
        let err = fetch_document(&client, &url).await.unwrap_err();

        assert!(matches!(err, FaqPilotError::Fetch(_)));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn extract_writes_corpus_from_fetched_documents() {
        let server = wiremock::MockServer::start().await;
        let docx = faq_docx("General", &[("When does it start?", "Mid January.")]);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/document/d/de-file-id/export"))
            .and(wiremock::matchers::query_param("format", "docx"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(docx))
            .expect(1)
            .mount(&server)
            .await;

        let config = ExtractConfig {
            sources: vec![SourceEntry {
                course: "data-engineering-zoomcamp".into(),
                file_id: "de-file-id".into(),
            }],
            output_path: temp_dir().join("documents.json"),
            export_base_url: server.uri(),
        };

        let result = extract_corpus(&config, &SilentProgress).await.unwrap();
        assert_eq!(result.course_count, 1);
        assert_eq!(result.record_count, 1);
        assert!(result.failed_courses.is_empty());

        let corpus = corpus::load_corpus(&config.output_path).unwrap();
        assert_eq!(corpus[0].course, "data-engineering-zoomcamp");
        assert_eq!(corpus[0].documents[0].question, "When does it start?");
        assert_eq!(corpus[0].documents[0].text, "Mid January.");
    }

    #[tokio::test]
    async fn extract_skips_failed_course_and_continues() {
        let server = wiremock::MockServer::start().await;
        let docx = faq_docx("General", &[("What is MLOps?", "Operating ML in production.")]);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/document/d/broken-id/export"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/document/d/mlops-id/export"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(docx))
            .mount(&server)
            .await;

        let config = ExtractConfig {
            sources: vec![
                SourceEntry {
                    course: "data-engineering-zoomcamp".into(),
                    file_id: "broken-id".into(),
                },
                SourceEntry {
                    course: "mlops-zoomcamp".into(),
                    file_id: "mlops-id".into(),
                },
            ],
            output_path: temp_dir().join("documents.json"),
            export_base_url: server.uri(),
        };

        let result = extract_corpus(&config, &SilentProgress).await.unwrap();
        assert_eq!(result.course_count, 1);
        assert_eq!(result.failed_courses, vec!["data-engineering-zoomcamp"]);

        let corpus = corpus::load_corpus(&config.output_path).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].course, "mlops-zoomcamp");
    }

    #[tokio::test]
    async fn extract_fails_when_every_course_fails() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = ExtractConfig {
            sources: vec![SourceEntry {
                course: "data-engineering-zoomcamp".into(),
                file_id: "any-id".into(),
            }],
            output_path: temp_dir().join("documents.json"),
            export_base_url: server.uri(),
        };

        let err = extract_corpus(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, FaqPilotError::Validation { .. }));
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn extract_rejects_garbage_document() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_bytes(b"not a docx".to_vec()),
            )
            .mount(&server)
            .await;

        let config = ExtractConfig {
            sources: vec![SourceEntry {
                course: "machine-learning-zoomcamp".into(),
                file_id: "garbage-id".into(),
            }],
            output_path: temp_dir().join("documents.json"),
            export_base_url: server.uri(),
        };

        // The lone course fails to decode, so the whole run fails.
        let err = extract_corpus(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, FaqPilotError::Validation { .. }));
    }

    // --- Index ---

    #[tokio::test]
    async fn index_provisions_then_writes_in_order() {
        let path = temp_dir().join("documents.json");
        let groups = vec![
            CourseDocuments {
                course: "a-course".into(),
                documents: vec![faq_record("Q1"), faq_record("Q2")],
            },
            CourseDocuments {
                course: "b-course".into(),
                documents: vec![faq_record("Q3")],
            },
        ];
        corpus::save_corpus(&path, &groups).unwrap();

        let store = RecordingStore::default();
        let config = IndexConfig {
            input_path: path,
            recreate: false,
        };

        let result = index_corpus(&config, &store, &SilentProgress).await.unwrap();
        assert_eq!(result.record_count, 3);
        assert_eq!(*store.calls.lock().unwrap(), vec!["create"]);

        let indexed = store.indexed.lock().unwrap();
        assert_eq!(indexed.len(), 3);
        assert_eq!(indexed[0].course, "a-course");
        assert_eq!(indexed[0].question, "Q1");
        assert_eq!(indexed[1].question, "Q2");
        assert_eq!(indexed[2].course, "b-course");
    }

    #[tokio::test]
    async fn index_recreate_deletes_existing_index_first() {
        let path = temp_dir().join("documents.json");
        corpus::save_corpus(
            &path,
            &[CourseDocuments {
                course: "a-course".into(),
                documents: vec![faq_record("Q1")],
            }],
        )
        .unwrap();

        let store = RecordingStore::default();
        let config = IndexConfig {
            input_path: path,
            recreate: true,
        };

        index_corpus(&config, &store, &SilentProgress).await.unwrap();
        assert_eq!(*store.calls.lock().unwrap(), vec!["delete", "create"]);
    }

    #[tokio::test]
    async fn index_write_failure_aborts() {
        let path = temp_dir().join("documents.json");
        corpus::save_corpus(
            &path,
            &[CourseDocuments {
                course: "a-course".into(),
                documents: vec![faq_record("Q1"), faq_record("Q2"), faq_record("Q3")],
            }],
        )
        .unwrap();

        let store = RecordingStore {
            fail_after: Some(1),
            ..Default::default()
        };
        let config = IndexConfig {
            input_path: path,
            recreate: false,
        };

        let err = index_corpus(&config, &store, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, FaqPilotError::IndexWrite(_)));
        assert_eq!(store.indexed.lock().unwrap().len(), 1);
    }

    // --- Ask ---

    #[tokio::test]
    async fn ask_grounds_prompt_in_retrieved_records() {
        let store = RecordingStore {
            results: vec![indexed_record(
                "General",
                "When does the course start?",
                "Mid January.",
            )],
            ..Default::default()
        };
        let provider = CannedCompletion::new("It starts in mid January.");
        let config = AskConfig {
            question: "when does it start?".into(),
            course: "data-engineering-zoomcamp".into(),
            top_k: 5,
        };

        let result = answer_question(&config, &store, &provider, &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.answer, "It starts in mid January.");
        assert_eq!(result.retrieved.len(), 1);

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("You're a course teaching assistant."));
        assert!(prompts[0].contains("QUESTION: when does it start?"));
        assert!(prompts[0].contains(
            "Section: General\nQuestion: When does the course start?\nAnswer: Mid January."
        ));
    }

    #[tokio::test]
    async fn ask_with_no_hits_sends_bare_context() {
        let store = RecordingStore::default();
        let provider = CannedCompletion::new("I don't know.");
        let config = AskConfig {
            question: "something obscure?".into(),
            course: "mlops-zoomcamp".into(),
            top_k: 5,
        };

        let result = answer_question(&config, &store, &provider, &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.answer, "I don't know.");
        assert!(result.retrieved.is_empty());

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("CONTEXT:"));
    }

    #[tokio::test]
    async fn ask_propagates_search_failure() {
        let store = RecordingStore {
            fail_search: true,
            ..Default::default()
        };
        let provider = CannedCompletion::new("unused");
        let config = AskConfig {
            question: "q".into(),
            course: "c".into(),
            top_k: 5,
        };

        let err = answer_question(&config, &store, &provider, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, FaqPilotError::Query(_)));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }
}
