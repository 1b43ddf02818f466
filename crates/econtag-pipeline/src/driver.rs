//! End-to-end classification pipeline.
//!
//! Per paper: acquire PDF → extract page text → build excerpt → chunk →
//! classify each chunk → merge. Papers run one at a time, chunks one at a
//! time. A paper whose PDF cannot be fetched or read degrades to the
//! fallback label set and the batch continues; a transport-level model
//! failure aborts the whole run.

use anyhow::Context;
use tracing::{info, warn};

use econtag_common::error::{EcontagError, Result as CommonResult};
use econtag_common::labels::LabelSet;
use econtag_common::paper::{ClassificationResult, Paper};
use econtag_ingestion::chunker::{chunk_excerpt, ChunkerConfig};
use econtag_ingestion::fetch::PdfFetcher;
use econtag_ingestion::keywords::ApproachKeywords;
use econtag_ingestion::pdf_text::extract_page_texts;
use econtag_ingestion::section::{extract_excerpt, ExtractorConfig};
use econtag_llm::aggregate::Aggregator;
use econtag_llm::backend::LlmError;
use econtag_llm::classifier::ChunkClassifier;

/// Everything the driver needs, wired once in `main`.
pub struct PipelineContext {
    pub fetcher: PdfFetcher,
    pub classifier: ChunkClassifier,
    pub aggregator: Aggregator,
    /// Keyword hints are optional; `None` disables the extra candidate.
    pub keywords: Option<ApproachKeywords>,
    pub extractor: ExtractorConfig,
    pub chunker: ChunkerConfig,
}

/// Counters for one batch run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub papers_total: usize,
    /// Papers whose PDF was unavailable and whose labels are pure fallback.
    pub papers_degraded: usize,
    pub chunks_classified: usize,
    /// Model replies that failed to parse and were absorbed as the empty
    /// sentinel candidate.
    pub malformed_replies: usize,
    pub duration_ms: u64,
}

/// Classify every paper in order. Always yields exactly one result per
/// paper unless the run aborts on a transport-fatal model error.
pub async fn run_batch(
    papers: &[Paper],
    ctx: &PipelineContext,
) -> anyhow::Result<(Vec<ClassificationResult>, RunSummary)> {
    let t0 = std::time::Instant::now();
    let mut summary = RunSummary { papers_total: papers.len(), ..Default::default() };
    let mut results = Vec::with_capacity(papers.len());

    for paper in papers {
        let labels = classify_paper(paper, ctx, &mut summary)
            .await
            .with_context(|| format!("classification aborted at paper '{}'", paper.title))?;
        info!(
            title = %paper.title,
            methodology = ?labels.methodology,
            field = ?labels.field,
            empirical_approach = ?labels.empirical_approach,
            "paper classified"
        );
        results.push(ClassificationResult { paper: paper.clone(), labels });
    }

    summary.duration_ms = t0.elapsed().as_millis() as u64;
    Ok((results, summary))
}

/// Classify one paper. Source-unavailable conditions degrade to the
/// fallback label set (merge of zero candidates); only model transport
/// errors escape.
async fn classify_paper(
    paper: &Paper,
    ctx: &PipelineContext,
    summary: &mut RunSummary,
) -> std::result::Result<LabelSet, LlmError> {
    let pages = match acquire_pages(paper, ctx).await {
        Ok(pages) => pages,
        Err(e) => {
            warn!(
                title = %paper.title,
                error = %e,
                "PDF unavailable; degrading paper to fallback labels"
            );
            summary.papers_degraded += 1;
            return Ok(ctx.aggregator.merge(&[]));
        }
    };

    let excerpt = extract_excerpt(&pages, &ctx.extractor);
    let chunks = chunk_excerpt(&excerpt, &ctx.chunker);

    let mut candidates = Vec::with_capacity(chunks.len() + 1);
    for chunk in &chunks {
        let outcome = ctx.classifier.classify_chunk(paper, chunk).await?;
        summary.chunks_classified += 1;
        if outcome.malformed {
            summary.malformed_replies += 1;
        }
        candidates.push(outcome.candidate);
    }

    if let Some(keywords) = &ctx.keywords {
        candidates.push(keywords.scan(&excerpt));
    }

    Ok(ctx.aggregator.merge(&candidates))
}

/// Fetch the PDF and extract per-page text off the async reactor.
async fn acquire_pages(paper: &Paper, ctx: &PipelineContext) -> CommonResult<Vec<String>> {
    let fetched = ctx.fetcher.fetch(paper).await?;
    let path = fetched.path().to_path_buf();
    let pages = tokio::task::spawn_blocking(move || extract_page_texts(&path))
        .await
        .map_err(|e| EcontagError::Pipeline(format!("PDF parse task failed: {e}")))??;
    drop(fetched); // temp file must outlive the parse
    Ok(pages)
}
