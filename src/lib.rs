//! Import of Gene Matrix Transposed (GMT) gene-set files.
//!
//! A GMT file holds one gene set per line: a name, a description and one or
//! more gene identifiers, all tab-separated. Sources may be local paths or
//! `http(s)` URLs and may be gzip-compressed; compression is detected from
//! the content.
//!
//! ```no_run
//! use gmt_import::{DedupPolicy, ImportOptions, OutputForm};
//!
//! let options = ImportOptions {
//!     dedup: DedupPolicy::Last,
//!     output: OutputForm::Mapping,
//!     ..ImportOptions::default()
//! };
//! let result = gmt_import::import("h.all.v2023.1.Hs.symbols.gmt.gz", &options)?;
//! println!("{} gene sets", result.len());
//! # Ok::<(), gmt_import::GmtError>(())
//! ```

pub mod collection;
pub mod config;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod importer;
pub mod output;
pub mod parser;
pub mod source;

pub use collection::{GeneSetCollection, GeneSetMap};
pub use domain::{DedupPolicy, GeneIdType, GeneSet, OutputForm, SourceLocator};
pub use error::{DuplicateName, GmtError};
pub use importer::{ImportOptions, ImportResult, Importer};

/// Imports `source` with a default HTTP-capable client.
pub fn import(source: &str, options: &ImportOptions) -> Result<ImportResult, GmtError> {
    let locator: SourceLocator = source.parse()?;
    let client = source::HttpSourceClient::new()?;
    Importer::new(client).import(&locator, options)
}
