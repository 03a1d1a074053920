use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DedupPolicy, GeneIdType, OutputForm};
use crate::error::GmtError;
use crate::importer::ImportOptions;
use crate::source::DEFAULT_TIMEOUT;

pub const DEFAULT_CONFIG_FILE: &str = "gmt-import.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gene_id_type: Option<String>,
    #[serde(default)]
    pub dedup: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub gene_id_type: Option<GeneIdType>,
    pub dedup: DedupPolicy,
    pub output: OutputForm,
    pub timeout: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            gene_id_type: None,
            dedup: DedupPolicy::default(),
            output: OutputForm::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Values given on the command line; `None` leaves the config value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gene_id_type: Option<String>,
    pub dedup: Option<DedupPolicy>,
    pub output: Option<OutputForm>,
    pub timeout_secs: Option<u64>,
}

impl ResolvedConfig {
    /// Layers `overrides` on top of the loaded config.
    pub fn apply_overrides(mut self, overrides: Overrides) -> Result<Self, GmtError> {
        if let Some(id_type) = overrides.gene_id_type.as_deref() {
            self.gene_id_type = Some(id_type.parse::<GeneIdType>()?);
        }
        if let Some(dedup) = overrides.dedup {
            self.dedup = dedup;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = timeout_from_secs(secs)?;
        }
        Ok(self)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            gene_id_type: self.gene_id_type.clone(),
            dedup: self.dedup,
            output: self.output,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `gmt-import.json` from the working directory when no
    /// path is given. A missing default file yields the defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GmtError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GmtError::ConfigRead(config_path.clone()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|err| GmtError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GmtError> {
        let gene_id_type = config
            .gene_id_type
            .as_deref()
            .map(str::parse::<GeneIdType>)
            .transpose()?;
        let dedup = config
            .dedup
            .as_deref()
            .map(str::parse::<DedupPolicy>)
            .transpose()?
            .unwrap_or_default();
        let output = config
            .output
            .as_deref()
            .map(str::parse::<OutputForm>)
            .transpose()?
            .unwrap_or_default();
        let timeout = match config.timeout_secs {
            Some(secs) => timeout_from_secs(secs)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(ResolvedConfig {
            gene_id_type,
            dedup,
            output,
            timeout,
        })
    }
}

fn timeout_from_secs(secs: u64) -> Result<Duration, GmtError> {
    if secs == 0 {
        return Err(GmtError::ConfigParse(
            "timeout must be greater than zero seconds".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
