use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gauge")]
#[command(version)]
#[command(about = "Reconcile dashboards, datasources and rule groups with their backends", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/gauge/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend settings; each overrides the matching config file entry
#[derive(Args, Debug, Default, Clone)]
pub struct BackendArgs {
    /// Grafana base URL
    #[arg(long, env = "GRAFANA_URL", global = true)]
    pub grafana_url: Option<String>,

    /// Grafana API token
    #[arg(long, env = "GRAFANA_TOKEN", global = true, hide_env_values = true)]
    pub grafana_token: Option<String>,

    /// Grafana user for basic auth
    #[arg(long, env = "GRAFANA_USER", global = true)]
    pub grafana_user: Option<String>,

    /// Grafana password for basic auth
    #[arg(long, env = "GRAFANA_PASSWORD", global = true, hide_env_values = true)]
    pub grafana_password: Option<String>,

    /// Ruler base URL
    #[arg(long, env = "CORTEX_ADDRESS", global = true)]
    pub ruler_url: Option<String>,

    /// Ruler tenant id
    #[arg(long, env = "CORTEX_TENANT_ID", global = true)]
    pub ruler_tenant_id: Option<String>,

    /// Ruler API key
    #[arg(long, env = "CORTEX_API_KEY", global = true, hide_env_values = true)]
    pub ruler_api_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or update declared resources on their backends
    Apply(ApplyArgs),

    /// Show differences between declared and remote resources
    Diff(SelectArgs),

    /// Print declared resources as they would be compared
    Show(SelectArgs),

    /// List declared resources
    List(SelectArgs),

    /// Print a remote resource
    Get {
        /// Provider name (datasource, dashboard, rulegroup)
        kind: String,

        /// Resource uid (`<namespace>/<group>` for rule groups)
        uid: String,
    },

    /// Write declared resources to a directory, one file each
    Export {
        #[command(flatten)]
        select: SelectArgs,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Push declared resources to a preview environment
    Preview(SelectArgs),

    /// List registered providers and the paths they claim
    Providers,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared Arguments
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Declared input files or directories (`-` reads stdin)
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Only resources of a kind, or `kind.uid` substring
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Number of resources applied in parallel
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Stop at the first failure and skip the rest
    #[arg(long)]
    pub fail_fast: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "gauge", "-vv", "apply", "out.json", "-t", "dashboard", "-j", "4", "--fail-fast",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.select.inputs, vec![PathBuf::from("out.json")]);
                assert_eq!(args.select.target.as_deref(), Some("dashboard"));
                assert_eq!(args.jobs, 4);
                assert!(args.fail_fast);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_apply_defaults_to_sequential() {
        let cli = Cli::try_parse_from(["gauge", "apply", "out.json"]).unwrap();
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.jobs, 1);
                assert!(!args.fail_fast);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["gauge", "diff"]).is_err());
    }

    #[test]
    fn test_export_requires_output() {
        assert!(Cli::try_parse_from(["gauge", "export", "out.json"]).is_err());
        let cli = Cli::try_parse_from(["gauge", "export", "out.json", "-o", "dir"]).unwrap();
        assert!(matches!(cli.command, Command::Export { .. }));
    }

    #[test]
    fn test_backend_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gauge",
            "get",
            "datasource",
            "prom-1",
            "--grafana-url",
            "http://g",
        ])
        .unwrap();
        assert_eq!(cli.backend.grafana_url.as_deref(), Some("http://g"));
    }
}
