use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::parse_window;
use crate::error::ConfigError;

#[derive(Parser)]
#[command(name = "stocktake")]
#[command(about = "Inventory snapshots and sales reconciliation")]
#[command(version)]
pub struct Cli {
    /// SQLite database to use instead of the configured one
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record the current inventory and show what changed since the last reading
    Capture(CaptureArgs),

    /// List stored snapshots
    History(HistoryArgs),

    /// Reconstruct sales between two snapshots
    Reconcile(ReconcileArgs),

    /// Compare group totals of two snapshots
    Compare(CompareArgs),

    /// Group counts and inventory value of a snapshot
    Stats(StatsArgs),

    /// Delete the whole snapshot history
    Reset(ResetArgs),
}

#[derive(Parser)]
pub struct CaptureArgs {
    /// JSON file with the current article list
    #[arg(long)]
    pub articles: PathBuf,

    /// JSON file with the grouped summary (tallied from articles when omitted).
    /// Only echoed in this capture's report: history, compare and stats always
    /// tally groups from the stored articles
    #[arg(long)]
    pub resumen: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Clone, Default)]
pub struct RangeArgs {
    /// Starting snapshot ID
    #[arg(long)]
    pub from: Option<String>,

    /// Ending snapshot ID
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Reconcile from the oldest snapshot in this window to the latest ("7d", "24h")
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub since: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl ReconcileArgs {
    /// Time window to reconcile over, if any.
    ///
    /// `--since` wins. The configured window applies only when neither
    /// `--from` nor `--to` was given, so a lone bound still reaches the
    /// "both must be specified" check.
    pub fn window(&self, configured: Option<Duration>) -> Result<Option<Duration>, ConfigError> {
        match &self.since {
            Some(since) => parse_window(since).map(Some),
            None if self.range.from.is_none() && self.range.to.is_none() => Ok(configured),
            None => Ok(None),
        }
    }
}

#[derive(Parser)]
pub struct CompareArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct StatsArgs {
    /// Snapshot ID (defaults to the latest)
    #[arg(long)]
    pub id: Option<String>,

    /// Show detail for one group
    #[arg(long, conflicts_with = "ungrouped")]
    pub group: Option<String>,

    /// Show detail for articles without a group
    #[arg(long, default_value_t = false)]
    pub ungrouped: bool,

    /// JSON file listing the codes in the group (defaults to the articles' group field)
    #[arg(long)]
    pub codes: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ResetArgs {
    /// Confirm deletion of every stored snapshot
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: Duration = Duration::from_secs(7 * 86_400);

    fn reconcile_args(argv: &[&str]) -> ReconcileArgs {
        let cli = Cli::try_parse_from([&["stocktake", "reconcile"][..], argv].concat()).unwrap();
        match cli.command {
            Command::Reconcile(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn configured_window_used_without_bounds() {
        assert_eq!(reconcile_args(&[]).window(Some(WEEK)).unwrap(), Some(WEEK));
        assert_eq!(reconcile_args(&[]).window(None).unwrap(), None);
    }

    #[test]
    fn since_overrides_configured_window() {
        let args = reconcile_args(&["--since", "24h"]);
        assert_eq!(args.window(Some(WEEK)).unwrap(), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn any_bound_disables_configured_window() {
        assert_eq!(reconcile_args(&["--from", "1", "--to", "2"]).window(Some(WEEK)).unwrap(), None);
        assert_eq!(reconcile_args(&["--from", "1"]).window(Some(WEEK)).unwrap(), None);
        // a lone --to must not be swallowed by the configured window
        assert_eq!(reconcile_args(&["--to", "2"]).window(Some(WEEK)).unwrap(), None);
    }

    #[test]
    fn since_conflicts_with_bounds() {
        assert!(Cli::try_parse_from(["stocktake", "reconcile", "--since", "7d", "--to", "2"]).is_err());
    }

    #[test]
    fn compare_accepts_json() {
        let cli = Cli::try_parse_from(["stocktake", "compare", "--from", "1", "--to", "2", "--json"]).unwrap();
        match cli.command {
            Command::Compare(args) => {
                assert!(args.json);
                assert_eq!(args.range.from.as_deref(), Some("1"));
            }
            _ => unreachable!(),
        }
    }
}
