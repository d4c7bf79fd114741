use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "kubepane",
    version,
    about = "A panel-based terminal browser for Kubernetes resources."
)]
pub struct CliArgs {
    /// Start in a specific namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Start with all namespaces selected
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Watch refresh interval in milliseconds (minimum 250)
    #[arg(long)]
    pub watch_interval_ms: Option<u64>,

    /// Number of log lines fetched per pod
    #[arg(long)]
    pub log_tail_lines: Option<i64>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Write tracing output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Config file path (defaults to KUBEPANE_CONFIG or the usual locations)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
