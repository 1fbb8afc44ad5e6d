use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Effective configuration after merging defaults, the optional settings
/// file, `NMAP_PILOT_*` environment variables, and command-line flags
/// (highest precedence).
#[derive(Debug, Clone)]
pub struct Settings {
    pub nmap_path: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    nmap_path: Option<String>,
    output_dir: Option<PathBuf>,
}

impl Settings {
    pub fn load(
        file: Option<&Path>,
        nmap_path_flag: Option<String>,
        output_dir_flag: Option<PathBuf>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        builder = builder.add_source(config::Environment::with_prefix("NMAP_PILOT"));

        let loaded = builder
            .build()
            .with_context(|| match file {
                Some(path) => format!("failed to read settings file at {}", path.display()),
                None => "failed to read settings from environment".to_string(),
            })?
            .try_deserialize::<FileSettings>()
            .context("invalid settings structure")?;

        Ok(Self {
            nmap_path: nmap_path_flag
                .or(loaded.nmap_path)
                .unwrap_or_else(|| "nmap".to_string()),
            output_dir: output_dir_flag
                .or(loaded.output_dir)
                .unwrap_or_else(|| PathBuf::from("scan_results")),
        })
    }
}
