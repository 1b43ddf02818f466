//! CSV and JSON export of classification results.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use econtag_common::labels::LabelSet;
use econtag_common::paper::ClassificationResult;

const CSV_HEADERS: [&str; 7] = [
    "title",
    "authors",
    "journal",
    "date",
    "methodology",
    "field",
    "empirical_approach",
];

fn join_labels(labels: &BTreeSet<String>) -> String {
    labels.iter().map(String::as_str).collect::<Vec<_>>().join("; ")
}

/// One flat row per paper; multi-value cells joined with "; ".
pub fn write_csv(results: &[ClassificationResult], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADERS)?;
    for result in results {
        writer.write_record(&[
            result.paper.title.clone(),
            result.paper.authors_joined(),
            result.paper.journal.clone(),
            result.paper.date.clone(),
            join_labels(&result.labels.methodology),
            join_labels(&result.labels.field),
            join_labels(&result.labels.empirical_approach),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    title: &'a str,
    authors: &'a [String],
    journal: &'a str,
    date: &'a str,
    pdf: &'a str,
    classification: &'a LabelSet,
}

impl<'a> From<&'a ClassificationResult> for JsonRecord<'a> {
    fn from(result: &'a ClassificationResult) -> Self {
        Self {
            title:          &result.paper.title,
            authors:        &result.paper.authors,
            journal:        &result.paper.journal,
            date:           &result.paper.date,
            pdf:            &result.paper.pdf,
            classification: &result.labels,
        }
    }
}

/// Full result list as pretty JSON: metadata plus the three label arrays.
pub fn write_json(results: &[ClassificationResult], path: &Path) -> anyhow::Result<()> {
    let records: Vec<JsonRecord> = results.iter().map(JsonRecord::from).collect();
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, &records)?;
    Ok(())
}
