use clap::Parser;
use stocktake::aggregate::{compare_resumen, group_detail, inventory_value, resumen_counts};
use stocktake::capture;
use stocktake::cli::{Cli, Command, RangeArgs, StatsArgs};
use stocktake::config::Config;
use stocktake::error::{Error, RangeError};
use stocktake::model::{GroupFilter, Snapshot};
use stocktake::reconcile;
use stocktake::report::{self, table, ComparisonView, GroupView, HistoryRow, StatsView};
use stocktake::source::{self, FileSource, InventorySource};
use stocktake::store::{SnapshotStore, SqliteStorage};

type Store = SnapshotStore<SqliteStorage>;

fn parse_id(value: &str, flag: &str) -> i64 {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} snapshot ID: '{value}'. Must be a number.");
        std::process::exit(1);
    })
}

/// Snapshots named by --from/--to, or the two most recent.
fn resolve_range(history: &[Snapshot], args: &RangeArgs) -> Result<(Snapshot, Snapshot), RangeError> {
    if args.from.is_some() != args.to.is_some() {
        eprintln!("Both --from and --to must be specified together.");
        std::process::exit(1);
    }

    let (start, end) = match (&args.from, &args.to) {
        (Some(from), Some(to)) => (
            reconcile::find(history, parse_id(from, "--from"))?,
            reconcile::find(history, parse_id(to, "--to"))?,
        ),
        _ => reconcile::latest_pair(history)?,
    };

    Ok((start.clone(), end.clone()))
}

fn run_stats(store: &Store, args: &StatsArgs) -> Result<(), Error> {
    let history = store.all();
    let snapshot = match &args.id {
        Some(id) => reconcile::find(&history, parse_id(id, "--id"))?,
        None => history.last().ok_or(RangeError::EmptyHistory)?,
    };

    let group = match (&args.group, args.ungrouped) {
        (Some(name), _) => Some(GroupFilter::Named(name.clone())),
        (None, true) => Some(GroupFilter::Ungrouped),
        (None, false) => None,
    };

    let group = match group {
        Some(filter) => {
            let codes = match &args.codes {
                Some(path) => source::read_codes(path)?,
                None => snapshot
                    .articles
                    .iter()
                    .filter(|a| filter.matches(a))
                    .map(|a| a.code.clone())
                    .collect(),
            };
            let label = match &filter {
                GroupFilter::Named(name) => name.clone(),
                GroupFilter::Ungrouped => "(ungrouped)".to_string(),
            };
            Some(GroupView {
                label,
                detail: group_detail(&snapshot.articles, &filter, &codes),
            })
        }
        None => None,
    };

    let view = StatsView {
        snapshot_id: snapshot.id,
        captured_at: snapshot.captured_at,
        counts: resumen_counts(&snapshot.resumen()),
        inventory_value: inventory_value(&snapshot.articles),
        group,
    };

    report::print(&view, args.json, table::render_stats);
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<(), Error> {
    let storage = SqliteStorage::open(&config.database)?;
    let mut store = SnapshotStore::new(storage);

    match cli.command {
        Command::Capture(args) => {
            let mut file_source = FileSource::new(&args.articles);
            if let Some(resumen) = &args.resumen {
                file_source = file_source.with_resumen(resumen);
            }

            let inventory = file_source.fetch()?;
            let outcome = capture::capture(&mut store, inventory)?;
            report::print(&outcome, args.json, table::render_capture);
        }
        Command::History(args) => {
            let rows: Vec<HistoryRow> = store.all().iter().map(HistoryRow::from_snapshot).collect();
            report::print(&rows, args.json, table::render_history);
        }
        Command::Reconcile(args) => {
            let history = store.all();
            let window = args.window(config.window)?;

            let (start, end) = match window {
                Some(window) => {
                    let (start, end) = reconcile::select_window(&history, chrono::Utc::now(), window)?;
                    (start.clone(), end.clone())
                }
                None => resolve_range(&history, &args.range)?,
            };

            let result = reconcile::reconcile(&start, &end);
            report::print(&result, args.json, table::render_ledger);
        }
        Command::Compare(args) => {
            let history = store.all();
            let (start, end) = resolve_range(&history, &args.range)?;

            let view = ComparisonView {
                from_id: start.id,
                from_captured_at: start.captured_at,
                to_id: end.id,
                to_captured_at: end.captured_at,
                comparison: compare_resumen(&start.resumen(), &end.resumen()),
            };
            report::print(&view, args.json, table::render_comparison);
        }
        Command::Stats(args) => run_stats(&store, &args)?,
        Command::Reset(args) => {
            if !args.yes {
                let count = store.all().len();
                eprintln!("This deletes all {count} stored snapshots. Re-run with --yes to confirm.");
                std::process::exit(1);
            }
            store.clear()?;
            println!("Snapshot history cleared.");
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let default_filter = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(cli, config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
