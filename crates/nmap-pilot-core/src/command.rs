use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Verbosity switch guaranteed to appear exactly once in every invocation.
pub const VERBOSE_FLAG: &str = "-v";

static TARGET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}(/\d{1,2})?$").expect("target regex"));

/// A validated scan target: four dot-separated 1-3 digit octet groups with an
/// optional `/`-prefixed CIDR suffix. Octet values are not range-checked
/// beyond digit count, matching nmap's own lenient acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Target {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TargetParseError::Empty);
        }
        if !TARGET_PATTERN.is_match(trimmed) {
            return Err(TargetParseError::Malformed(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Errors emitted while validating target strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("target must not be empty")]
    Empty,
    #[error("invalid target `{0}` (expected an IPv4 address or CIDR range, e.g. 192.168.1.0/24)")]
    Malformed(String),
}

/// Nmap's built-in timing templates, `-T0` through `-T5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingPreset {
    Paranoid,
    Sneaky,
    Polite,
    Normal,
    Aggressive,
    Insane,
}

impl TimingPreset {
    pub const ALL: [TimingPreset; 6] = [
        TimingPreset::Paranoid,
        TimingPreset::Sneaky,
        TimingPreset::Polite,
        TimingPreset::Normal,
        TimingPreset::Aggressive,
        TimingPreset::Insane,
    ];

    pub fn flag(self) -> &'static str {
        match self {
            TimingPreset::Paranoid => "-T0",
            TimingPreset::Sneaky => "-T1",
            TimingPreset::Polite => "-T2",
            TimingPreset::Normal => "-T3",
            TimingPreset::Aggressive => "-T4",
            TimingPreset::Insane => "-T5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimingPreset::Paranoid => "Paranoid",
            TimingPreset::Sneaky => "Sneaky",
            TimingPreset::Polite => "Polite",
            TimingPreset::Normal => "Normal",
            TimingPreset::Aggressive => "Aggressive",
            TimingPreset::Insane => "Insane",
        }
    }
}

/// File-writing modes understood by nmap. `All` expands to nmap's own
/// multi-format convention (`-oA` writes one file per format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Normal,
    Xml,
    Grepable,
    All,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Normal,
        OutputFormat::Xml,
        OutputFormat::Grepable,
        OutputFormat::All,
    ];

    pub fn flag(self) -> &'static str {
        match self {
            OutputFormat::Normal => "-oN",
            OutputFormat::Xml => "-oX",
            OutputFormat::Grepable => "-oG",
            OutputFormat::All => "-oA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Normal => "Normal",
            OutputFormat::Xml => "XML",
            OutputFormat::Grepable => "Grepable",
            OutputFormat::All => "All formats",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Normal => "txt",
            OutputFormat::Xml => "xml",
            OutputFormat::Grepable => "grep",
            OutputFormat::All => "all",
        }
    }
}

/// Generate a timestamped output path, `<dir>/scan_<YYYYMMDD_HHMMSS>.<ext>`.
/// The file itself is written by nmap, not by this program.
pub fn output_file(dir: &Path, format: OutputFormat) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("scan_{}.{}", timestamp, format.extension()))
}

/// An ordered flag list plus a validated target, rendered as the argument
/// vector `[...flags, target, "-v"?]`. The verbosity flag is appended only
/// when the caller has not supplied one already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmapCommand {
    flags: Vec<String>,
    target: Target,
}

impl NmapCommand {
    pub fn new(target: Target) -> Self {
        Self {
            flags: Vec::new(),
            target,
        }
    }

    pub fn push_flag(&mut self, flag: impl Into<String>) {
        self.flags.push(flag.into());
    }

    pub fn extend_flags<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
    }

    pub fn timing(&mut self, preset: TimingPreset) {
        self.flags.push(preset.flag().to_string());
    }

    pub fn output(&mut self, format: OutputFormat, path: &Path) {
        self.flags.push(format.flag().to_string());
        self.flags.push(path.display().to_string());
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Render the full argument vector, ensuring the verbosity flag is
    /// present exactly once. Idempotent: rendering twice, or rendering a
    /// command whose flags already carry `-v`, never duplicates it.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = self.flags.clone();
        args.push(self.target.0.clone());
        if !self.flags.iter().any(|flag| flag == VERBOSE_FLAG) {
            args.push(VERBOSE_FLAG.to_string());
        }
        args
    }
}

impl fmt::Display for NmapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_args().join(" "))
    }
}
