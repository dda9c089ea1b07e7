use clap::Parser;

/// triageplan — group static-analysis issues into reviewable fix plans
#[derive(Parser, Debug, Clone)]
#[command(name = "triageplan", version, about)]
pub struct Cli {
    /// Path to the issues JSON file (default: issues.json)
    #[arg(long)]
    pub issues: Option<String>,

    /// Output directory (default: out)
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Cycle identifier for traceability (default: timestamp-based id)
    #[arg(long)]
    pub cycle_id: Option<String>,

    /// Pin every timestamp of the run to this RFC 3339 instant
    #[arg(long)]
    pub generated_at: Option<String>,

    /// Maximum number of groups in the work set (default: 5)
    #[arg(long)]
    pub max_groups: Option<usize>,

    /// Maximum number of issues per group (default: 8)
    #[arg(long)]
    pub max_issues_per_group: Option<usize>,

    /// Record that the same file may appear in multiple groups (informational)
    #[arg(long)]
    pub allow_file_overlap: bool,

    /// Path to config file (default: .triageplan/config.toml, if present)
    #[arg(long)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
