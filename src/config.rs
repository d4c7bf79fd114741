use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::app::AppOptions;
use crate::cli::CliArgs;

pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 1_000;
pub const MIN_WATCH_INTERVAL_MS: u64 = 250;
pub const DEFAULT_LOG_TAIL_LINES: i64 = 1_000;

#[derive(Debug, Clone, Deserialize, Default, Eq, PartialEq)]
struct KubepaneConfigFile {
    #[serde(default, alias = "watch_interval")]
    watch_interval_ms: Option<u64>,
    #[serde(default, alias = "tail_lines")]
    log_tail_lines: Option<i64>,
    #[serde(default, alias = "namespace")]
    default_namespace: Option<String>,
}

/// Effective startup settings after merging the config file with CLI flags.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    pub source: Option<PathBuf>,
    pub watch_interval: Duration,
    pub log_tail_lines: i64,
    pub default_namespace: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: None,
            watch_interval: Duration::from_millis(DEFAULT_WATCH_INTERVAL_MS),
            log_tail_lines: DEFAULT_LOG_TAIL_LINES,
            default_namespace: None,
        }
    }
}

impl Settings {
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let path = args.config.clone().or_else(discover_config_path);
        let file = match &path {
            Some(path) => load_config_file(path)?,
            None => KubepaneConfigFile::default(),
        };
        Ok(merge(path, file, args))
    }

    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            watch_interval: self.watch_interval,
            log_tail_lines: self.log_tail_lines,
        }
    }
}

fn load_config_file(path: &Path) -> Result<KubepaneConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(KubepaneConfigFile::default());
    }
    serde_yaml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn merge(source: Option<PathBuf>, file: KubepaneConfigFile, args: &CliArgs) -> Settings {
    let watch_ms = args
        .watch_interval_ms
        .or(file.watch_interval_ms)
        .unwrap_or(DEFAULT_WATCH_INTERVAL_MS)
        .max(MIN_WATCH_INTERVAL_MS);
    let log_tail_lines = args
        .log_tail_lines
        .or(file.log_tail_lines)
        .filter(|lines| *lines > 0)
        .unwrap_or(DEFAULT_LOG_TAIL_LINES);
    let default_namespace = file
        .default_namespace
        .map(|namespace| namespace.trim().to_string())
        .filter(|namespace| !namespace.is_empty());

    Settings {
        source,
        watch_interval: Duration::from_millis(watch_ms),
        log_tail_lines,
        default_namespace,
    }
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KUBEPANE_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [PathBuf::from("kubepane.yaml"), PathBuf::from("kubepane.yml")];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kubepane/config.yaml"),
            PathBuf::from(&home).join(".config/kubepane/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}
