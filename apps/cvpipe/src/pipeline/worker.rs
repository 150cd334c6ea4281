//! Extraction worker — one document in, exactly one result out.
//!
//! Load, LLM call, and strict parse make up one attempt; any of the
//! three failing triggers an exponential backoff and a retry, up to the
//! configured ceiling. The backoff sleep suspends only this worker's
//! task, never the pool. Exhausted retries become a failure result
//! carrying the last error — nothing propagates past this boundary.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::EXTRACTION_PROMPT_TEMPLATE;
use crate::llm_client::{strip_json_fences, CompletionService, LlmError};
use crate::loader::{DocumentRef, DocumentSource, LoadError};
use crate::models::candidate::CandidateRecord;
use crate::pipeline::ExtractionResult;
use crate::usage::UsageMeter;

/// Output cap for extraction replies.
const EXTRACTION_MAX_TOKENS: u32 = 4000;
/// Deterministic sampling for extraction.
const EXTRACTION_TEMPERATURE: f32 = 0.0;

/// One attempt's failure. `Display` text ends up in failure metadata.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Service(#[from] LlmError),

    #[error("Model reply was not a valid candidate record: {0}")]
    Parse(serde_json::Error),
}

/// Backoff before retry `attempt + 1`: 1 s, 2 s, 4 s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt)
}

pub struct ExtractionWorker {
    source: Arc<dyn DocumentSource>,
    service: Arc<dyn CompletionService>,
    meter: Arc<UsageMeter>,
    max_retries: u32,
}

impl ExtractionWorker {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        service: Arc<dyn CompletionService>,
        meter: Arc<UsageMeter>,
        max_retries: u32,
    ) -> Self {
        Self {
            source,
            service,
            meter,
            max_retries,
        }
    }

    /// Runs the full attempt loop for one document. Always returns a
    /// result; a document that fails every attempt yields the failure
    /// variant with the final error's description.
    pub async fn extract(&self, doc: &DocumentRef) -> ExtractionResult {
        let filename = doc.file_name();
        let mut last_error = String::from("no attempts were made");

        for attempt in 0..self.max_retries.max(1) {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt - 1)).await;
            }

            match self.attempt(doc).await {
                Ok((candidate, tokens)) => {
                    info!("Successfully parsed {filename}");
                    return ExtractionResult::success(
                        candidate,
                        filename,
                        doc.format.extension(),
                        tokens,
                    );
                }
                Err(e) => {
                    warn!("Attempt {} failed for {filename}. Error: {e}", attempt + 1);
                    last_error = e.to_string();
                }
            }
        }

        ExtractionResult::failure(filename, doc.format.extension(), last_error)
    }

    /// One load → complete → parse cycle. The meter is updated on every
    /// successful remote call, even when the reply fails to parse —
    /// those tokens were still billed.
    async fn attempt(&self, doc: &DocumentRef) -> Result<(CandidateRecord, u32), AttemptError> {
        let resume_text = self.source.load(doc)?;
        let prompt = EXTRACTION_PROMPT_TEMPLATE.replace("{resume_text}", &resume_text);

        let completion = self
            .service
            .complete(&prompt, EXTRACTION_MAX_TOKENS, EXTRACTION_TEMPERATURE)
            .await?;
        self.meter.update(completion.total_tokens);

        let candidate: CandidateRecord =
            serde_json::from_str(strip_json_fences(&completion.text))
                .map_err(AttemptError::Parse)?;

        Ok((candidate, completion.total_tokens))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{ScriptedService, ScriptedSource};
    use super::*;
    use std::path::PathBuf;

    fn doc(name: &str) -> DocumentRef {
        DocumentRef::new(PathBuf::from(format!("/resumes/{name}"))).unwrap()
    }

    fn worker(
        source: ScriptedSource,
        service: ScriptedService,
        meter: Arc<UsageMeter>,
    ) -> ExtractionWorker {
        ExtractionWorker::new(Arc::new(source), Arc::new(service), meter, 3)
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_extraction() {
        let meter = Arc::new(UsageMeter::new());
        let w = worker(
            ScriptedSource { fail: false },
            ScriptedService::ok(crate::models::candidate::SAMPLE_CANDIDATE, 1500),
            Arc::clone(&meter),
        );

        let result = w.extract(&doc("jane.txt")).await;
        assert!(result.is_success());
        assert_eq!(result.metadata.filename, "jane.txt");
        assert_eq!(result.metadata.file_type, ".txt");
        assert_eq!(result.metadata.tokens_used, Some(1500));
        assert_eq!(meter.get_stats().total_api_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_failing_all_attempts_yields_failure_result() {
        let meter = Arc::new(UsageMeter::new());
        let service = ScriptedService::ok("{}", 100);
        let calls = Arc::clone(&service.calls);
        let w = worker(ScriptedSource { fail: true }, service, Arc::clone(&meter));

        let result = w.extract(&doc("ghost.pdf")).await;
        assert!(!result.is_success());
        assert!(result
            .metadata
            .error
            .as_deref()
            .unwrap()
            .contains("File not found"));
        // The service is never reached when loading fails
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(meter.get_stats().total_api_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparseable_reply_retries_and_still_bills_tokens() {
        let meter = Arc::new(UsageMeter::new());
        let service = ScriptedService::ok("this is not json", 250);
        let calls = Arc::clone(&service.calls);
        let w = worker(ScriptedSource { fail: false }, service, Arc::clone(&meter));

        let result = w.extract(&doc("cv.docx")).await;
        assert!(!result.is_success());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
        // Tokens from every failed-parse attempt are still accounted
        assert_eq!(meter.get_stats().total_tokens, 750);
        assert_eq!(meter.get_stats().total_api_calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_error_surfaces_last_error_text() {
        let meter = Arc::new(UsageMeter::new());
        let service = ScriptedService::failing(|| LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        });
        let w = worker(ScriptedSource { fail: false }, service, Arc::clone(&meter));

        let result = w.extract(&doc("cv.pdf")).await;
        assert!(!result.is_success());
        assert!(result
            .metadata
            .error
            .as_deref()
            .unwrap()
            .contains("quota exceeded"));
        assert_eq!(meter.get_stats().total_api_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_backoff_totals_three_seconds() {
        let service = ScriptedService::ok("not json", 10);
        let w = worker(
            ScriptedSource { fail: false },
            service,
            Arc::new(UsageMeter::new()),
        );

        let started = tokio::time::Instant::now();
        let _ = w.extract(&doc("cv.txt")).await;
        // 3 attempts → sleeps of 1 s and 2 s between them
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fenced_json_reply_is_accepted() {
        let fenced = format!(
            "```json\n{}\n```",
            crate::models::candidate::SAMPLE_CANDIDATE
        );
        let w = worker(
            ScriptedSource { fail: false },
            ScriptedService::ok(&fenced, 900),
            Arc::new(UsageMeter::new()),
        );

        let result = w.extract(&doc("fenced.txt")).await;
        assert!(result.is_success());
        assert_eq!(
            result.candidate.as_ref().unwrap().full_name,
            "Jane Doe"
        );
    }
}
