use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::collection::GeneSetCollection;
use crate::domain::GeneIdType;
use crate::error::{DuplicateName, GmtError};
use crate::importer::{ImportOutcome, ImportResult};

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub source: String,
    pub gene_id_type: Option<GeneIdType>,
    pub parsed: usize,
    pub sets: usize,
    pub genes: usize,
    pub duplicates: Vec<DuplicateName>,
    pub imported_at: String,
}

impl ImportSummary {
    pub fn from_outcome(source: &str, outcome: &ImportOutcome) -> Self {
        let (gene_id_type, genes) = match &outcome.result {
            ImportResult::Collection(collection) => {
                (collection.gene_id_type().cloned(), collection.gene_count())
            }
            ImportResult::Mapping(map) => (None, map.iter().map(|(_, genes)| genes.len()).sum()),
        };
        Self {
            source: source.to_string(),
            gene_id_type,
            parsed: outcome.parsed,
            sets: outcome.result.len(),
            genes,
            duplicates: outcome.duplicates.clone(),
            imported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &ImportSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_result(result: &ImportResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct GmtOutput;

impl GmtOutput {
    pub fn print(collection: &GeneSetCollection) -> io::Result<()> {
        collection.write_gmt(io::stdout().lock())
    }

    /// Writes through a temp file in the destination directory, then renames.
    pub fn write_atomic(collection: &GeneSetCollection, path: &Utf8Path) -> Result<(), GmtError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| GmtError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("gmt-import")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| GmtError::Filesystem(err.to_string()))?;
        collection
            .write_gmt(io::BufWriter::new(temp.as_file_mut()))
            .map_err(|err| GmtError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| GmtError::Filesystem(err.to_string()))?;
        Ok(())
    }
}
