use std::io::BufRead;

use serde::Serialize;
use tracing::info;

use crate::collection::{GeneSetCollection, GeneSetMap};
use crate::dedup::{self, Resolved};
use crate::domain::{DedupPolicy, GeneIdType, OutputForm, SourceLocator};
use crate::error::{DuplicateName, GmtError};
use crate::parser;
use crate::source::SourceClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub gene_id_type: Option<GeneIdType>,
    pub dedup: DedupPolicy,
    pub output: OutputForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImportResult {
    Collection(GeneSetCollection),
    Mapping(GeneSetMap),
}

impl ImportResult {
    pub fn len(&self) -> usize {
        match self {
            ImportResult::Collection(collection) => collection.len(),
            ImportResult::Mapping(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_collection(&self) -> Option<&GeneSetCollection> {
        match self {
            ImportResult::Collection(collection) => Some(collection),
            ImportResult::Mapping(_) => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&GeneSetMap> {
        match self {
            ImportResult::Mapping(map) => Some(map),
            ImportResult::Collection(_) => None,
        }
    }
}

/// Result of one import together with the duplicate-name report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub result: ImportResult,
    pub parsed: usize,
    pub duplicates: Vec<DuplicateName>,
}

/// Stateless GMT importer over a content-retrieval client.
#[derive(Clone)]
pub struct Importer<S: SourceClient> {
    client: S,
}

impl<S: SourceClient> Importer<S> {
    pub fn new(client: S) -> Self {
        Self { client }
    }

    pub fn import(
        &self,
        source: &SourceLocator,
        options: &ImportOptions,
    ) -> Result<ImportResult, GmtError> {
        self.import_with_report(source, options)
            .map(|outcome| outcome.result)
    }

    pub fn import_with_report(
        &self,
        source: &SourceLocator,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, GmtError> {
        let reader = self.client.open(source)?;
        let outcome = import_reader_with_report(reader, &source.to_string(), options)?;
        info!(
            source = %source,
            parsed = outcome.parsed,
            kept = outcome.result.len(),
            duplicates = outcome.duplicates.len(),
            "imported GMT"
        );
        Ok(outcome)
    }
}

/// Imports already-opened GMT content.
pub fn import_reader<R: BufRead>(
    reader: R,
    options: &ImportOptions,
) -> Result<ImportResult, GmtError> {
    import_reader_with_report(reader, "<reader>", options).map(|outcome| outcome.result)
}

pub fn import_reader_with_report<R: BufRead>(
    reader: R,
    source_name: &str,
    options: &ImportOptions,
) -> Result<ImportOutcome, GmtError> {
    let raw = parser::parse_reader(reader, source_name)?;
    let parsed = raw.len();
    let Resolved { sets, duplicates } = dedup::resolve(raw, options.dedup)?;

    let collection = GeneSetCollection::new(sets, options.gene_id_type.clone());
    let result = match options.output {
        OutputForm::Collection => ImportResult::Collection(collection),
        OutputForm::Mapping => ImportResult::Mapping(collection.into_mapping()),
    };

    Ok(ImportOutcome {
        result,
        parsed,
        duplicates,
    })
}
