//! Report serialization and file output.

use crate::{ResultsError, ResultsResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> ResultsResult<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(ReportFormat::Json),
            Some("yaml" | "yml") => Ok(ReportFormat::Yaml),
            _ => Err(ResultsError::UnsupportedFormat {
                what: path.display().to_string(),
            }),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            other => Err(ResultsError::UnsupportedFormat {
                what: other.to_string(),
            }),
        }
    }
}

/// Pretty JSON or YAML text for any report.
pub fn render<T: Serialize>(report: &T, format: ReportFormat) -> ResultsResult<String> {
    Ok(match format {
        ReportFormat::Json => serde_json::to_string_pretty(report)?,
        ReportFormat::Yaml => serde_yaml::to_string(report)?,
    })
}

/// Write a report, choosing the format from the file extension. Parent
/// directories are created as needed.
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> ResultsResult<()> {
    let format = ReportFormat::from_path(path)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, render(report, format)?)?;
    Ok(())
}
