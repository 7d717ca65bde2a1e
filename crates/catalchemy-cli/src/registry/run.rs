use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalchemy_generate::{CatalogPlan, GenerationReport};

use super::{Artifact, RegistryError, RegistryResult};
use crate::config::Settings;

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub products: u64,
    pub plan: CatalogPlan,
    pub brand_guide: PathBuf,
    pub settings: Settings,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig<'a> {
    pub run_id: &'a str,
    pub started_at: String,
    pub products: u64,
    pub plan: &'a CatalogPlan,
    pub brand_guide: String,
    pub settings: &'a Settings,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub run_root: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

/// Create `<run_dir>/<timestamp>__run_<id>/` with `config.json` and an
/// empty `logs.ndjson`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&run_root).map_err(|source| RegistryError::RunDir {
        path: run_root.clone(),
        source,
    })?;

    let config_path = run_root.join(Artifact::Config.file_name());
    let logs_path = run_root.join(Artifact::Logs.file_name());
    let report_path = run_root.join(Artifact::Report.file_name());

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        products: ctx.products,
        plan: &ctx.plan,
        brand_guide: ctx.brand_guide.display().to_string(),
        settings: &ctx.settings,
        git: collect_git_info(),
    };

    write_json(Artifact::Config, &config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)
        .map_err(|source| RegistryError::Write {
            artifact: Artifact::Logs,
            path: logs_path.clone(),
            source,
        })?;

    Ok(RunPaths {
        run_root,
        logs_path,
        report_path,
    })
}

pub fn write_report(paths: &RunPaths, report: &GenerationReport) -> RegistryResult<()> {
    write_json(Artifact::Report, &paths.report_path, report)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(artifact: Artifact, path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|source| RegistryError::Write {
            artifact,
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|source| RegistryError::Serialize { artifact, source })
}
