//! PDF acquisition: remote download into a temp file, or a local path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use econtag_common::error::{EcontagError, Result};
use econtag_common::paper::{Paper, PdfSource};

const USER_AGENT: &str = concat!("econtag/", env!("CARGO_PKG_VERSION"));

/// A resolved PDF ready for parsing. Holds the temp file for downloaded
/// PDFs so the backing file outlives the returned path.
#[derive(Debug)]
pub enum FetchedPdf {
    Downloaded(NamedTempFile),
    Local(PathBuf),
}

impl FetchedPdf {
    pub fn path(&self) -> &Path {
        match self {
            FetchedPdf::Downloaded(file) => file.path(),
            FetchedPdf::Local(path)      => path,
        }
    }
}

/// Downloads remote PDFs and resolves local ones.
pub struct PdfFetcher {
    client: reqwest::Client,
}

impl PdfFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Resolve a paper's PDF source to a readable file on disk.
    ///
    /// Any failure here is a source-unavailable condition: the caller
    /// degrades that paper's result, it does not abort the batch.
    #[instrument(skip(self, paper), fields(title = %paper.title))]
    pub async fn fetch(&self, paper: &Paper) -> Result<FetchedPdf> {
        match paper.pdf_source() {
            PdfSource::Url(url) => self.download(&url).await,
            PdfSource::Path(path) => {
                if !path.exists() {
                    return Err(EcontagError::SourceUnavailable(format!(
                        "PDF not found at {}",
                        path.display()
                    )));
                }
                Ok(FetchedPdf::Local(path))
            }
        }
    }

    async fn download(&self, url: &str) -> Result<FetchedPdf> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(EcontagError::SourceUnavailable(format!(
                "PDF download failed: HTTP {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await?;
        let mut temp_file = NamedTempFile::new()?;
        std::io::Write::write_all(&mut temp_file, &bytes)?;
        debug!(url, size = bytes.len(), "PDF downloaded");
        Ok(FetchedPdf::Downloaded(temp_file))
    }
}
