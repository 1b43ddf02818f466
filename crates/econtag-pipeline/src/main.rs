//! econtag — chunked LLM classification of economics papers.
//! Entry point for the pipeline binary.

mod config;
mod driver;
mod output;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use econtag_common::labels::AllowedVocabulary;
use econtag_common::paper::load_papers;
use econtag_ingestion::fetch::PdfFetcher;
use econtag_ingestion::keywords::ApproachKeywords;
use econtag_llm::aggregate::Aggregator;
use econtag_llm::backend::OpenAiCompatibleBackend;
use econtag_llm::classifier::ChunkClassifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("econtag=debug,info")),
        )
        .init();

    info!("econtag starting up");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match config::Config::load() {
        Ok(c) => {
            info!(model = %c.llm.model, papers_file = %c.input.papers_file, "Configuration loaded");
            c
        }
        Err(e) => {
            warn!("Could not load econtag.toml: {e}");
            warn!("Copy econtag.example.toml to econtag.toml and edit it.");
            return Ok(());
        }
    };

    let papers = load_papers(Path::new(&config.input.papers_file))
        .with_context(|| format!("loading papers from {}", config.input.papers_file))?;
    info!(n_papers = papers.len(), "Paper list loaded");

    let Some(api_key) = config.llm.resolve_api_key() else {
        anyhow::bail!(
            "No API key found: set llm.api_key in econtag.toml or the ECONTAG_API_KEY env var"
        );
    };

    let vocabulary = AllowedVocabulary::default();
    let backend = Arc::new(OpenAiCompatibleBackend::new(
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        Some(api_key),
    ));

    let ctx = driver::PipelineContext {
        fetcher: PdfFetcher::new(config.extract.download_timeout())?,
        classifier: ChunkClassifier::new(
            backend,
            vocabulary.clone(),
            config.llm.retry_policy(),
            config.llm.max_tokens,
        ),
        aggregator: Aggregator::new(vocabulary, config.labels.fallback_labels()),
        keywords: config.extract.keyword_hints.then(ApproachKeywords::default),
        extractor: config.extract.extractor_config(),
        chunker: config.extract.chunker_config(),
    };

    let (results, summary) = driver::run_batch(&papers, &ctx).await?;

    output::write_csv(&results, Path::new(&config.output.csv_path))
        .with_context(|| format!("writing {}", config.output.csv_path))?;
    output::write_json(&results, Path::new(&config.output.json_path))
        .with_context(|| format!("writing {}", config.output.json_path))?;
    info!(csv = %config.output.csv_path, json = %config.output.json_path, "Results written");

    info!(
        papers = summary.papers_total,
        degraded = summary.papers_degraded,
        chunks = summary.chunks_classified,
        malformed_replies = summary.malformed_replies,
        duration_ms = summary.duration_ms,
        "Classification run complete"
    );

    Ok(())
}
