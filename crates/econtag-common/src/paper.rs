//! Paper metadata model and the TOML papers file loader.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::labels::LabelSet;

/// One paper to classify. Read-only input for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    /// Author names, in publication order.
    pub authors: Vec<String>,
    pub journal: String,
    /// Free-form date string; never machine-parsed.
    pub date: String,
    /// URL or local filesystem path of the paper's PDF.
    pub pdf: String,
}

impl Paper {
    /// Distinguish remote vs local PDF sources by URL-scheme prefix.
    pub fn pdf_source(&self) -> PdfSource {
        if self.pdf.starts_with("http://") || self.pdf.starts_with("https://") {
            PdfSource::Url(self.pdf.clone())
        } else {
            PdfSource::Path(PathBuf::from(&self.pdf))
        }
    }

    pub fn authors_joined(&self) -> String {
        self.authors.join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfSource {
    Url(String),
    Path(PathBuf),
}

/// One paper plus its merged, validated label set.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub paper: Paper,
    pub labels: LabelSet,
}

#[derive(Debug, Deserialize)]
struct PapersFile {
    papers: Vec<Paper>,
}

/// Load the paper list from a TOML file with `[[papers]]` entries.
pub fn load_papers(path: &Path) -> Result<Vec<Paper>> {
    let content = std::fs::read_to_string(path)?;
    let file: PapersFile = toml::from_str(&content)?;
    Ok(file.papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_source_url() {
        let paper = Paper {
            title:   "T".to_string(),
            authors: vec!["A".to_string()],
            journal: "J".to_string(),
            date:    "2020".to_string(),
            pdf:     "https://example.org/paper.pdf".to_string(),
        };
        assert_eq!(
            paper.pdf_source(),
            PdfSource::Url("https://example.org/paper.pdf".to_string())
        );
    }

    #[test]
    fn test_pdf_source_local_path() {
        let paper = Paper {
            title:   "T".to_string(),
            authors: vec![],
            journal: "J".to_string(),
            date:    "2020".to_string(),
            pdf:     "pdfs/card.pdf".to_string(),
        };
        assert_eq!(paper.pdf_source(), PdfSource::Path(PathBuf::from("pdfs/card.pdf")));
    }

    #[test]
    fn test_authors_joined() {
        let paper = Paper {
            title:   "T".to_string(),
            authors: vec!["David Card".to_string(), "Jesse Rothstein".to_string()],
            journal: "QJE".to_string(),
            date:    "2008".to_string(),
            pdf:     "pdfs/card.pdf".to_string(),
        };
        assert_eq!(paper.authors_joined(), "David Card; Jesse Rothstein");
    }

    #[test]
    fn test_load_papers_from_toml() {
        let toml_src = r#"
            [[papers]]
            title = "Tipping and the Dynamics of Segregation"
            authors = ["David Card", "Alexandre Mas", "Jesse Rothstein"]
            journal = "QJE"
            date = "2008"
            pdf = "pdfs/card.pdf"
        "#;
        let file: PapersFile = toml::from_str(toml_src).unwrap();
        assert_eq!(file.papers.len(), 1);
        assert_eq!(file.papers[0].authors.len(), 3);
    }
}
