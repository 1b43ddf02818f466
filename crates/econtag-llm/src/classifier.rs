//! Per-chunk classification against the model service.
//!
//! One call per chunk: build the prompt, ride out throttling with bounded
//! exponential backoff, strip any code-fence wrapping, parse the reply as a
//! raw label candidate. A malformed reply degrades to the all-empty
//! sentinel, which is valid aggregator input, not a failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use econtag_common::labels::{AllowedVocabulary, LabelSet};
use econtag_common::paper::Paper;

use crate::audit::LlmCallAudit;
use crate::backend::{LlmBackend, LlmError, LlmRequest, Message};

/// Backoff policy for throttled calls. The ceiling bounds worst-case
/// blocking; exhaustion surfaces `LlmError::RetriesExhausted`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(10),
            max_attempts: 6,
        }
    }
}

/// Outcome of classifying one chunk.
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    /// Raw candidate; not vocabulary-checked here. Filtering is the
    /// aggregator's job.
    pub candidate: LabelSet,
    /// True when the reply failed to parse and the all-empty sentinel was
    /// substituted.
    pub malformed: bool,
}

pub struct ChunkClassifier {
    backend: Arc<dyn LlmBackend>,
    vocabulary: AllowedVocabulary,
    retry: RetryPolicy,
    max_tokens: u32,
}

impl ChunkClassifier {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        vocabulary: AllowedVocabulary,
        retry: RetryPolicy,
        max_tokens: u32,
    ) -> Self {
        Self { backend, vocabulary, retry, max_tokens }
    }

    /// Classify one chunk of one paper.
    ///
    /// Errors are transport-level only (non-throttling API failures, or an
    /// exhausted backoff ceiling); a reply that arrives but does not parse
    /// is absorbed into the sentinel candidate.
    #[instrument(skip(self, paper, chunk), fields(title = %paper.title, chunk_chars = chunk.chars().count()))]
    pub async fn classify_chunk(
        &self,
        paper: &Paper,
        chunk: &str,
    ) -> Result<ChunkOutcome, LlmError> {
        let request = LlmRequest {
            messages: vec![Message {
                role: "user".to_string(),
                content: self.build_prompt(paper, chunk),
            }],
            max_tokens: Some(self.max_tokens),
            temperature: Some(0.1),
        };

        let started = Instant::now();
        let mut attempt: u32 = 0;
        let response = loop {
            attempt += 1;
            match self.backend.complete(request.clone()).await {
                Ok(resp) => break resp,
                Err(LlmError::RateLimited) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(LlmError::RetriesExhausted { attempts: attempt });
                    }
                    let delay = self.retry.base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        "model service throttled; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        let audit = LlmCallAudit::new(
            response.model.clone(),
            response.prompt_tokens,
            response.completion_tokens,
            &response.content,
            started.elapsed().as_millis() as u64,
        );
        debug!(?audit, "model call complete");

        let stripped = strip_code_fence(&response.content);
        match serde_json::from_str::<LabelSet>(stripped) {
            Ok(candidate) => Ok(ChunkOutcome { candidate, malformed: false }),
            Err(e) => {
                warn!(
                    error = %e,
                    reply_chars = response.content.chars().count(),
                    "malformed model reply; substituting empty candidate"
                );
                Ok(ChunkOutcome { candidate: LabelSet::default(), malformed: true })
            }
        }
    }

    fn build_prompt(&self, paper: &Paper, chunk: &str) -> String {
        let join = |labels: &std::collections::BTreeSet<String>| {
            labels.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        };

        format!(
            "You are an expert economist. Classify this paper using ONLY the options below.\n\
             Always select at least one methodology and field.\n\
             \n\
             Methodology options: {methods}\n\
             Field options: {fields}\n\
             Empirical approach options: {approaches}\n\
             \n\
             Paper:\n\
             Title: {title}\n\
             Authors: {authors}\n\
             Journal: {journal}\n\
             Date: {date}\n\
             \n\
             Text:\n\
             \"\"\"{chunk}\"\"\"\n\
             \n\
             Return STRICT JSON with exactly these keys:\n\
             {{\"methodology\": [...], \"field\": [...], \"empirical_approach\": [...]}}",
            methods    = join(&self.vocabulary.methodology),
            fields     = join(&self.vocabulary.field),
            approaches = join(&self.vocabulary.empirical_approach),
            title      = paper.title,
            authors    = paper.authors.join(", "),
            journal    = paper.journal,
            date       = paper.date,
            chunk      = chunk,
        )
    }
}

/// Strip a surrounding Markdown code fence, keeping the payload.
///
/// Handles "```json\n…\n```", bare "```\n…\n```", and unfenced replies.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // Drop an optional language tag on the opening fence line.
    match inner.find('\n') {
        Some(pos) if inner[..pos].chars().all(|c| c.is_ascii_alphanumeric()) => {
            inner[pos + 1..].trim()
        }
        _ => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::backend::LlmResponse;

    /// Backend that replays a scripted sequence of results.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<LlmResponse, LlmError>>) -> Arc<Self> {
            Arc::new(Self { script: Mutex::new(script.into()) })
        }

        fn reply(content: &str) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                content: content.to_string(),
                model: "scripted".to_string(),
                prompt_tokens: 10,
                completion_tokens: 5,
            })
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted backend exhausted")
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn test_paper() -> Paper {
        Paper {
            title:   "Tipping and the Dynamics of Segregation".to_string(),
            authors: vec!["David Card".to_string(), "Jesse Rothstein".to_string()],
            journal: "QJE".to_string(),
            date:    "2008".to_string(),
            pdf:     "pdfs/card.pdf".to_string(),
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy { base_delay: Duration::from_millis(1), max_attempts: 3 }
    }

    fn classifier(backend: Arc<dyn LlmBackend>) -> ChunkClassifier {
        ChunkClassifier::new(backend, AllowedVocabulary::default(), fast_retry(), 800)
    }

    #[tokio::test]
    async fn test_plain_json_reply_parses() {
        let backend = ScriptedBackend::new(vec![ScriptedBackend::reply(
            r#"{"methodology": ["Empirical"], "field": ["Labor"], "empirical_approach": ["RCT"]}"#,
        )]);
        let outcome = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap();
        assert!(!outcome.malformed);
        assert!(outcome.candidate.methodology.contains("Empirical"));
        assert!(outcome.candidate.field.contains("Labor"));
    }

    #[tokio::test]
    async fn test_fenced_reply_is_unwrapped() {
        let backend = ScriptedBackend::new(vec![ScriptedBackend::reply(
            "```json\n{\"methodology\": [\"Theory\"]}\n```",
        )]);
        let outcome = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap();
        assert!(!outcome.malformed);
        assert!(outcome.candidate.methodology.contains("Theory"));
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades_to_empty_sentinel() {
        let backend =
            ScriptedBackend::new(vec![ScriptedBackend::reply("I think this is a Labor paper.")]);
        let outcome = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap();
        assert!(outcome.malformed);
        assert!(outcome.candidate.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_vocabulary_labels_pass_through_unfiltered() {
        // Vocabulary filtering belongs to the aggregator, not the client.
        let backend = ScriptedBackend::new(vec![ScriptedBackend::reply(
            r#"{"methodology": ["Alchemy"]}"#,
        )]);
        let outcome = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap();
        assert!(outcome.candidate.methodology.contains("Alchemy"));
    }

    #[tokio::test]
    async fn test_throttling_retries_then_succeeds() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::RateLimited),
            Err(LlmError::RateLimited),
            ScriptedBackend::reply(r#"{"field": ["Trade"]}"#),
        ]);
        let outcome = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap();
        assert!(outcome.candidate.field.contains("Trade"));
    }

    #[tokio::test]
    async fn test_throttling_ceiling_surfaces_retries_exhausted() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::RateLimited),
            Err(LlmError::RateLimited),
            Err(LlmError::RateLimited),
        ]);
        let err = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RetriesExhausted { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_api_error_propagates_without_retry() {
        let backend = ScriptedBackend::new(vec![Err(LlmError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        })]);
        let err = classifier(backend)
            .classify_chunk(&test_paper(), "chunk text")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, .. }));
    }

    #[test]
    fn test_prompt_embeds_vocabulary_metadata_and_chunk() {
        let backend = ScriptedBackend::new(vec![]);
        let c = classifier(backend);
        let prompt = c.build_prompt(&test_paper(), "the chunk body");
        assert!(prompt.contains("Regression Discontinuity"));
        assert!(prompt.contains("Industrial Organization"));
        assert!(prompt.contains("Tipping and the Dynamics of Segregation"));
        assert!(prompt.contains("David Card, Jesse Rothstein"));
        assert!(prompt.contains("QJE"));
        assert!(prompt.contains("2008"));
        assert!(prompt.contains("the chunk body"));
        assert!(prompt.contains("STRICT JSON"));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  ```json\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence("```{}```"), "{}");
    }
}
