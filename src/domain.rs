use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use camino::Utf8PathBuf;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GmtError;

static REMOTE_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+$").expect("remote scheme regex"));

/// One line of a GMT file: a named, described, ordered list of gene identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneSet {
    pub name: String,
    pub description: String,
    pub genes: Vec<String>,
}

impl GeneSet {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        genes: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            genes,
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Namespace of the gene identifiers in a source.
///
/// Carried as metadata only; the importer never maps identifiers between
/// namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeneIdType {
    Symbol,
    Entrez,
    Ensembl,
    Uniprot,
    Other(String),
}

impl GeneIdType {
    pub fn as_str(&self) -> &str {
        match self {
            GeneIdType::Symbol => "symbol",
            GeneIdType::Entrez => "entrez",
            GeneIdType::Ensembl => "ensembl",
            GeneIdType::Uniprot => "uniprot",
            GeneIdType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for GeneIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneIdType {
    type Err = GmtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GmtError::ConfigParse(
                "gene identifier type must not be empty".to_string(),
            ));
        }
        let tag = match trimmed.to_ascii_lowercase().as_str() {
            "symbol" | "gene-symbol" | "genesymbol" => GeneIdType::Symbol,
            "entrez" | "entrez-id" | "entrezid" | "ncbi-gene" => GeneIdType::Entrez,
            "ensembl" | "ensembl-id" => GeneIdType::Ensembl,
            "uniprot" => GeneIdType::Uniprot,
            _ => GeneIdType::Other(trimmed.to_string()),
        };
        Ok(tag)
    }
}

impl Serialize for GeneIdType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GeneIdType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How repeated gene-set names are resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Keep the first occurrence, warn about the rest.
    #[default]
    First,
    /// Keep the last occurrence, warn about the rest.
    Last,
    /// Fail, naming every repeated name.
    Error,
    /// Keep every occurrence.
    None,
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupPolicy::First => write!(f, "first"),
            DedupPolicy::Last => write!(f, "last"),
            DedupPolicy::Error => write!(f, "error"),
            DedupPolicy::None => write!(f, "none"),
        }
    }
}

impl FromStr for DedupPolicy {
    type Err = GmtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(DedupPolicy::First),
            "last" => Ok(DedupPolicy::Last),
            "error" => Ok(DedupPolicy::Error),
            "none" => Ok(DedupPolicy::None),
            _ => Err(GmtError::InvalidPolicy(value.to_string())),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputForm {
    /// Ordered gene sets with descriptions and identifier-type metadata.
    #[default]
    Collection,
    /// Plain name to genes mapping.
    Mapping,
}

impl fmt::Display for OutputForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputForm::Collection => write!(f, "collection"),
            OutputForm::Mapping => write!(f, "mapping"),
        }
    }
}

impl FromStr for OutputForm {
    type Err = GmtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "collection" => Ok(OutputForm::Collection),
            "mapping" => Ok(OutputForm::Mapping),
            _ => Err(GmtError::InvalidOutputForm(value.to_string())),
        }
    }
}

/// Where GMT content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Path(Utf8PathBuf),
    Url(String),
}

impl SourceLocator {
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceLocator::Url(_))
    }

    /// Filename suffix hint; content sniffing has the final say.
    pub fn has_gzip_suffix(&self) -> bool {
        let raw = match self {
            SourceLocator::Path(path) => path.as_str(),
            SourceLocator::Url(url) => url.split(['?', '#']).next().unwrap_or(url),
        };
        raw.to_ascii_lowercase().ends_with(".gz")
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::Path(path) => write!(f, "{path}"),
            SourceLocator::Url(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for SourceLocator {
    type Err = GmtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GmtError::InvalidSource(value.to_string()));
        }
        if REMOTE_SCHEME.is_match(trimmed) {
            return Ok(SourceLocator::Url(trimmed.to_string()));
        }
        if trimmed.contains("://") && !trimmed.starts_with("file://") {
            return Err(GmtError::InvalidSource(value.to_string()));
        }
        let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        if path.is_empty() {
            return Err(GmtError::InvalidSource(value.to_string()));
        }
        Ok(SourceLocator::Path(Utf8PathBuf::from(path)))
    }
}

impl From<Utf8PathBuf> for SourceLocator {
    fn from(path: Utf8PathBuf) -> Self {
        SourceLocator::Path(path)
    }
}
