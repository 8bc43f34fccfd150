use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use roa_replays::config::{self, ManagerConfig, Settings};
use roa_replays::manager::{ReplayManager, SortSummary};
use roa_replays::progress::{fmt_duration, ProgressConfig, ProgressMode};
use roa_replays::sets::{self, SetRoots, TransferSummary};
use roa_replays::version;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "roa-replays",
    version,
    about = "Rivals of Aether replay manager: sort replays by version and build ML datasets"
)]
struct Cli {
    /// Config file with a [RivalsofAether] section
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override PathToReplays (the live replay folder)
    #[arg(long, global = true)]
    replays: Option<PathBuf>,

    /// Root for collections, frames, labels and sets. Default: the replay folder.
    #[arg(long, global = true)]
    destination: Option<PathBuf>,

    /// Progress display mode: auto (TTY-aware), rich, plain, quiet.
    #[arg(long, global = true, value_enum, default_value_t = ProgressMode::Auto)]
    progress: ProgressMode,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort replay files by game version
    SortReplays,

    /// Create training and testing sets
    MakeSets {
        /// Probability that a replay goes to the training set
        #[arg(long, default_value_t = sets::DEFAULT_TRAIN_RATIO)]
        train_ratio: f64,

        /// Seed for a reproducible split
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Create random sample
    MakeSample {
        /// Number of replays to copy into the sample
        #[arg(long, default_value_t = sets::DEFAULT_SAMPLE_SIZE)]
        size: usize,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Rotate the next unvisited replay into the live slot for capture
    NextReplay {
        /// Collection directory. Default: the one for the configured GameVersion.
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Keep replays already in the live slot (the capture process may see several).
        #[arg(long, default_value_t = false)]
        skip_deletions: bool,
    },

    /// Show collections, visitation counts and live slot contents
    Status {
        /// Only report this collection directory
        #[arg(long)]
        collection: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help and --version go to stdout and are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    let manager_config = ManagerConfig::from_settings(&settings, cli.replays, cli.destination);
    let progress = ProgressConfig::new(cli.progress);

    match cli.cmd {
        Commands::SortReplays => {
            // backing up would empty the pile we are about to sort
            let manager = ReplayManager::new(manager_config.with_skip_backups(true))?;
            let summary = manager.make_collections(progress).with_context(|| {
                format!("failed to sort replays in {}", manager.replays_path().display())
            })?;
            print_sort_summary(&summary)?;
        }

        Commands::MakeSets { train_ratio, seed } => {
            let manager = ReplayManager::new(manager_config.with_skip_backups(true))?;
            let mut rng = make_rng(seed);
            let summaries =
                sets::make_ml_sets(&set_roots(&manager), train_ratio, &mut rng, progress)
                    .context("failed to build training/testing sets")?;
            for summary in &summaries {
                print_transfer_summary(summary);
            }
        }

        Commands::MakeSample { size, seed } => {
            let manager = ReplayManager::new(manager_config.with_skip_backups(true))?;
            let mut rng = make_rng(seed);
            let summary = sets::make_random_sample(&set_roots(&manager), size, &mut rng, progress)
                .context("failed to build random sample")?;
            print_transfer_summary(&summary);
        }

        Commands::NextReplay {
            collection,
            skip_deletions,
        } => {
            let mut manager = ReplayManager::new(manager_config)?;
            let name = manager
                .load_collection(collection.as_deref())
                .context("failed to load replay collection")?;
            match manager.load_next_available(skip_deletions) {
                Ok(record) => {
                    let remaining = manager
                        .collection()
                        .map(|c| c.count_unvisited())
                        .unwrap_or(0);
                    println!(
                        "Next replay: id={} collection={} live={} frames={} labels={} remaining={}",
                        record.id(),
                        name,
                        manager.replays_path().join(record.id()).display(),
                        display_opt(record.frames_dest()),
                        display_opt(record.labels_dest()),
                        remaining,
                    );
                }
                Err(err) if err.is_exhausted() => {
                    println!("No unvisited replays left in collection {}", name);
                }
                Err(err) => return Err(err).context("failed to load next replay"),
            }
        }

        Commands::Status { collection } => {
            let manager = ReplayManager::new(manager_config.with_skip_backups(true))?;
            print_status(manager, collection)?;
        }
    }

    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn set_roots(manager: &ReplayManager) -> SetRoots {
    SetRoots {
        frames_root: manager.frames_root().to_path_buf(),
        labels_root: manager.labels_root().to_path_buf(),
        sets_root: manager.sets_root().to_path_buf(),
    }
}

fn display_opt(p: Option<&Path>) -> String {
    p.map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_sort_summary(summary: &SortSummary) -> Result<()> {
    println!(
        "Sort summary: moved={} versions={}",
        summary.moved,
        summary.per_version.len()
    );
    for (token, count) in &summary.per_version {
        println!(
            "  {} (version {}): {} replays",
            token,
            version::token_to_version(token)?,
            count
        );
    }
    Ok(())
}

fn print_transfer_summary(summary: &TransferSummary) {
    println!(
        "Set summary: set={} mode={:?} transferred={} skipped={} duration={}",
        summary.set,
        summary.mode,
        summary.transferred,
        summary.skipped,
        fmt_duration(summary.elapsed),
    );
    for warning in &summary.warnings {
        println!("  warning: {}", warning);
    }
}

fn print_status(mut manager: ReplayManager, only: Option<PathBuf>) -> Result<()> {
    let paths: Vec<PathBuf> = match only {
        Some(path) => vec![path],
        None => manager
            .list_collections()?
            .into_iter()
            .map(|token| manager.destination_root().join(token))
            .collect(),
    };

    println!(
        "Status: replays={} destination={} game_version={}",
        manager.replays_path().display(),
        manager.destination_root().display(),
        manager.game_version(),
    );
    let live = manager.live_replays()?;
    let unsorted = manager
        .collections_by_version()
        .context("failed to read live replay headers")?;

    for path in &paths {
        let name = manager
            .load_collection(Some(path))
            .with_context(|| format!("failed to load collection {}", path.display()))?;
        let Some(collection) = manager.collection() else {
            continue;
        };
        let human = version::token_to_version(&name).unwrap_or_else(|_| "-".to_string());
        let in_slot: Vec<&str> = live
            .iter()
            .filter(|r| collection.replay_by_id(r.id()).is_some())
            .map(|r| r.id())
            .collect();
        println!(
            "Collection {} (version {}): size={} unvisited={} collected={} live={}",
            name,
            human,
            collection.count(),
            collection.count_unvisited(),
            collection.count() - collection.count_unvisited(),
            if in_slot.is_empty() {
                "-".to_string()
            } else {
                in_slot.join(",")
            },
        );
    }

    if live.is_empty() {
        println!("Live slot: empty");
    } else {
        for (token, records) in &unsorted {
            for record in records {
                println!("Live slot: {} (version token {})", record.id(), token);
            }
        }
    }
    Ok(())
}
