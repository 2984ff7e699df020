//! Filemover CLI
//!
//! Runs, lists, validates and creates mover configurations.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filemover::rules::{DEFAULT_TIMESTAMP_FORMAT, RenameRule};
use filemover::{
    CollisionAvoidance, Config, DestinationCollision, FileOutcome, Mover, MoverConfig,
    RenamePipeline, SourceRetention, TimestampPolicy, TimestampPosition,
};

#[derive(Parser, Debug)]
#[command(name = "filemover")]
#[command(author, version, about = "Rule-driven file routing")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run every configured mover (default)
    Run {
        /// Only show what would happen
        #[arg(long)]
        dry_run: bool,
    },

    /// List files each mover would pick up
    List,

    /// Validate config file
    Check,

    /// Create a mover and write it to a config file
    New(NewArgs),
}

#[derive(clap::Args, Debug)]
struct NewArgs {
    /// Config file to write (.json or .toml)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Add to the movers already in the output file instead of replacing it
    #[arg(long)]
    append: bool,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Source directory (repeatable)
    #[arg(long = "source", value_name = "DIR", required = true)]
    sources: Vec<PathBuf>,

    /// Destination directory (repeatable)
    #[arg(long = "dest", value_name = "DIR", required = true)]
    destinations: Vec<PathBuf>,

    /// Exact file type without the dot (repeatable)
    #[arg(long = "type", value_name = "EXT")]
    file_types: Vec<String>,

    #[arg(long, value_name = "REGEX")]
    type_regex: Option<String>,

    #[arg(long, value_name = "REGEX")]
    type_exclude_regex: Option<String>,

    /// Exact file name without extension (repeatable)
    #[arg(long = "file-name", value_name = "NAME")]
    file_names: Vec<String>,

    #[arg(long, value_name = "REGEX")]
    name_regex: Option<String>,

    #[arg(long, value_name = "REGEX")]
    name_exclude_regex: Option<String>,

    #[arg(long, value_name = "TEXT")]
    name_contains: Option<String>,

    #[arg(long, value_name = "TEXT")]
    name_starts_with: Option<String>,

    #[arg(long, value_name = "TEXT")]
    name_ends_with: Option<String>,

    /// Walk source directories recursively
    #[arg(long)]
    recursive: bool,

    /// Source retention policy
    #[arg(long, default_value = "never_keep")]
    keep: SourceRetention,

    /// What to do when a destination file already exists
    #[arg(long, default_value = "ignore")]
    on_collision: DestinationCollision,

    /// When to abandon a file entirely because of collisions
    #[arg(long, default_value = "none")]
    avoid: CollisionAvoidance,

    /// Text prepended to the renamed file
    #[arg(long, value_name = "TEXT")]
    prefix: Option<String>,

    /// Text appended to the renamed file
    #[arg(long, value_name = "TEXT")]
    suffix: Option<String>,

    /// Match --replace search terms case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Replace rule, applied in the order given (repeatable)
    #[arg(long = "replace", value_name = "SEARCH=REPLACE", value_parser = parse_replace)]
    replacements: Vec<RenameRule>,

    /// Insert a timestamp into the file name. Implied by the other
    /// timestamp options.
    #[arg(long)]
    timestamp: bool,

    /// strftime layout of the timestamp
    #[arg(long, value_name = "FORMAT")]
    timestamp_format: Option<String>,

    /// IANA time zone of the timestamp (default: local time)
    #[arg(long, value_name = "TZ")]
    timezone: Option<String>,

    /// start, after_prefix, before_suffix or end
    #[arg(long, value_name = "POSITION")]
    timestamp_position: Option<String>,
}

fn parse_replace(s: &str) -> std::result::Result<RenameRule, String> {
    match s.split_once('=') {
        Some((search, replace)) if !search.is_empty() => Ok(RenameRule::new(search, replace)),
        _ => Err(format!("expected SEARCH=REPLACE with a non-empty SEARCH, got '{s}'")),
    }
}

impl NewArgs {
    /// Rename pipeline requested by the flags, if any
    fn rename(&self) -> Result<Option<RenamePipeline>> {
        let wants_timestamp = self.timestamp
            || self.timestamp_format.is_some()
            || self.timezone.is_some()
            || self.timestamp_position.is_some();
        if !wants_timestamp
            && self.prefix.is_none()
            && self.suffix.is_none()
            && self.replacements.is_empty()
        {
            return Ok(None);
        }

        let mut builder = RenamePipeline::builder()
            .case_sensitive(self.case_sensitive)
            .prefix(self.prefix.clone().unwrap_or_default())
            .suffix(self.suffix.clone().unwrap_or_default())
            .rules(self.replacements.clone());

        if wants_timestamp {
            let position = match self.timestamp_position {
                Some(ref p) => p.parse::<TimestampPosition>()?,
                None => TimestampPosition::default(),
            };
            builder = builder.timestamp(TimestampPolicy::new(
                self.timestamp_format
                    .as_deref()
                    .unwrap_or(DEFAULT_TIMESTAMP_FORMAT),
                self.timezone.as_deref(),
                position,
            )?);
        }

        Ok(Some(builder.build()))
    }
}

/// Directories written by `new` must be absolute after `~`/`$VAR` expansion
fn absolute_dirs(dirs: &[PathBuf], kind: &str) -> Result<Vec<PathBuf>> {
    dirs.iter()
        .map(|dir| {
            let expanded = filemover::expand_path(dir);
            if !expanded.is_absolute() {
                bail!("{kind} directory must be an absolute path: {}", dir.display());
            }
            Ok(expanded)
        })
        .collect()
}

fn init_logging(verbose: bool, configured: Option<&str>) {
    let log_level = if verbose {
        "debug"
    } else {
        configured.unwrap_or("info")
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("FILEMOVER_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Load the config and validate every mover before anything is touched
fn load_movers(path: Option<&Path>) -> Result<(Config, Vec<Mover>)> {
    let config = Config::load(path)?;
    let movers = config
        .movers()
        .context("Invalid mover configuration")?
        .into_iter()
        .map(Mover::new)
        .collect();
    Ok((config, movers))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            let (config, movers) = load_movers(cli.config.as_deref())?;
            init_logging(cli.verbose, Some(&config.general.log_level));

            if movers.is_empty() {
                println!("No movers configured");
                return Ok(());
            }

            for mover in &movers {
                if dry_run {
                    print_plan(mover);
                } else {
                    let summary = mover.move_files();
                    println!(
                        "{}: {} matched, {} placed, {} cancelled, {} failed, {} copies, {} sources removed",
                        mover.config().name(),
                        summary.matched,
                        summary.placed,
                        summary.cancelled,
                        summary.failed,
                        summary.written,
                        summary.removed
                    );
                }
            }
        }
        Commands::List => {
            let (config, movers) = load_movers(cli.config.as_deref())?;
            init_logging(cli.verbose, Some(&config.general.log_level));

            for mover in &movers {
                println!("{}", mover.config());
                for path in mover.get_matched_files() {
                    println!("  {}", path.display());
                }
            }
        }
        Commands::Check => match load_movers(cli.config.as_deref()) {
            Ok((_, movers)) => {
                println!("✓ Config is valid");
                println!("  {} movers", movers.len());
                for mover in &movers {
                    println!("  - {}", mover.config());
                }
            }
            Err(e) => {
                eprintln!("✗ Config error: {:#}", e);
                std::process::exit(1);
            }
        },
        Commands::New(args) => {
            init_logging(cli.verbose, None);
            create_mover(args)?;
        }
    }

    Ok(())
}

fn print_plan(mover: &Mover) {
    println!("{}", mover.config());
    for source in mover.get_matched_files() {
        let (plan, outcome) = match mover.preview(&source) {
            Ok(preview) => preview,
            Err(e) => {
                println!("  [dry-run] {} -> error: {}", source.display(), e);
                continue;
            }
        };

        match outcome {
            FileOutcome::Cancelled { .. } => {
                println!("  [dry-run] {} -> cancelled (collisions)", source.display());
            }
            FileOutcome::Placed {
                written,
                skipped,
                failed,
                source_removed,
            } => {
                println!("  [dry-run] {}", source.display());
                for dest in &plan.destinations {
                    let note = if written.contains(dest) && plan.collides(dest) {
                        "exists, overwrite"
                    } else if written.contains(dest) {
                        "copy"
                    } else if skipped.contains(dest) {
                        "exists, skip"
                    } else if failed.contains(dest) {
                        "same file as source, refused"
                    } else {
                        continue;
                    };
                    println!("      -> {} ({})", dest.display(), note);
                }
                if source_removed {
                    println!("      source would be removed");
                }
            }
        }
    }
}

fn create_mover(args: NewArgs) -> Result<()> {
    let rename = args.rename()?;
    let mut builder = MoverConfig::builder()
        .source_directories(absolute_dirs(&args.sources, "source")?)
        .destination_directories(absolute_dirs(&args.destinations, "destination")?)
        .file_types(args.file_types)
        .file_names(args.file_names)
        .recursive(args.recursive)
        .keep_source_behavior(args.keep)
        .destination_collision_behavior(args.on_collision)
        .collision_avoidance_behavior(args.avoid);

    if let Some(name) = args.name {
        builder = builder.name(name);
    }
    if let Some(description) = args.description {
        builder = builder.description(description);
    }
    if let Some(p) = args.type_regex {
        builder = builder.file_type_regex(p);
    }
    if let Some(p) = args.type_exclude_regex {
        builder = builder.file_type_exclude_regex(p);
    }
    if let Some(p) = args.name_regex {
        builder = builder.file_name_regex(p);
    }
    if let Some(p) = args.name_exclude_regex {
        builder = builder.file_name_exclude_regex(p);
    }
    if let Some(s) = args.name_contains {
        builder = builder.file_name_contains(s);
    }
    if let Some(s) = args.name_starts_with {
        builder = builder.file_name_starts_with(s);
    }
    if let Some(s) = args.name_ends_with {
        builder = builder.file_name_ends_with(s);
    }

    if let Some(rename) = rename {
        builder = builder.rename(rename);
    }

    let mover = builder.build()?;

    let mut config = if args.append && args.output.exists() {
        Config::load(Some(&args.output))?
    } else {
        Config::default()
    };
    config.movers.push(mover.to_document());
    config.save(Some(&args.output))?;

    println!("✓ Saved mover '{}' to {}", mover.name(), args.output.display());
    Ok(())
}
