//! Placement engine - routes matched files into their destinations

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::DestinationCollision;
use crate::config::MoverConfig;
use crate::error::{MoverError, Result};
use crate::fs_ops;
use crate::walker;

/// Where a source file would go, computed without touching anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub source: PathBuf,
    /// One candidate per destination directory, in configured order
    pub destinations: Vec<PathBuf>,
    /// The subset of `destinations` that already exist, same order
    pub collisions: Vec<PathBuf>,
}

impl Placement {
    pub fn collides(&self, path: &Path) -> bool {
        self.collisions.iter().any(|c| c == path)
    }
}

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Collision avoidance stopped the move; nothing was written or removed
    Cancelled { collisions: Vec<PathBuf> },
    /// Destination attempts ran and the retention policy was applied
    Placed {
        written: Vec<PathBuf>,
        skipped: Vec<PathBuf>,
        failed: Vec<PathBuf>,
        source_removed: bool,
    },
}

/// Totals for one [`Mover::move_files`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub matched: usize,
    pub placed: usize,
    pub cancelled: usize,
    /// Files whose processing aborted (rename failure, unreadable source)
    pub failed: usize,
    pub written: usize,
    pub skipped: usize,
    pub write_failures: usize,
    pub removed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Cancelled { .. } => self.cancelled += 1,
            FileOutcome::Placed {
                written,
                skipped,
                failed,
                source_removed,
            } => {
                self.placed += 1;
                self.written += written.len();
                self.skipped += skipped.len();
                self.write_failures += failed.len();
                if *source_removed {
                    self.removed += 1;
                }
            }
        }
    }
}

/// Runs one validated [`MoverConfig`] against the filesystem
#[derive(Debug, Clone)]
pub struct Mover {
    config: MoverConfig,
}

impl Mover {
    pub fn new(config: MoverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MoverConfig {
        &self.config
    }

    /// Swap in another already-validated configuration
    pub fn set_config(&mut self, config: MoverConfig) {
        self.config = config;
    }

    /// Check a bare file name against the match rules
    pub fn matches_filename(&self, file_name: &str) -> bool {
        self.config.match_rules().matches(file_name)
    }

    /// Every file in the source directories that satisfies the match rules
    pub fn get_matched_files(&self) -> Vec<PathBuf> {
        self.candidates().collect()
    }

    /// Log every matched file at info level
    pub fn list_matched_files(&self) {
        for path in self.candidates() {
            info!("Matched file: {}", path.display());
        }
    }

    fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        let recursive = self.config.recursive();
        self.config
            .source_directories()
            .iter()
            .filter(|dir| {
                if dir.is_dir() {
                    true
                } else {
                    warn!("Source directory not found, skipping: {}", dir.display());
                    false
                }
            })
            .flat_map(move |dir| walker::walk(dir, recursive))
            .filter(|(_, name)| self.matches_filename(name))
            .map(|(dir, name)| dir.join(name))
    }

    /// Destination file name for `source`, renamed once and shared by
    /// every destination
    fn destination_name(&self, source: &Path) -> Result<String> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                MoverError::InvalidInput(format!("{} has no usable file name", source.display()))
            })?;

        match self.config.rename() {
            Some(rename) => {
                let renamed = rename.apply(name)?;
                debug!("Renamed {} -> {}", name, renamed);
                Ok(renamed)
            }
            None => Ok(name.to_string()),
        }
    }

    /// Compute destinations and collisions for `source` without side effects
    pub fn plan(&self, source: &Path) -> Result<Placement> {
        let name = self.destination_name(source)?;

        let destinations: Vec<PathBuf> = self
            .config
            .destination_directories()
            .iter()
            .map(|dir| dir.join(&name))
            .collect();
        let collisions = destinations
            .iter()
            .filter(|p| fs_ops::entity_exists(p))
            .cloned()
            .collect();

        Ok(Placement {
            source: source.to_path_buf(),
            destinations,
            collisions,
        })
    }

    /// Place one matched source file according to the configured policies
    pub fn process_file(&self, source: &Path) -> Result<FileOutcome> {
        let placement = self.checked_plan(source)?;
        Ok(self.place(placement, true))
    }

    /// The outcome `process_file` would report, without writing or removing
    /// anything. Every copy is assumed to succeed.
    pub fn preview(&self, source: &Path) -> Result<(Placement, FileOutcome)> {
        let placement = self.checked_plan(source)?;
        let outcome = self.place(placement.clone(), false);
        Ok((placement, outcome))
    }

    fn checked_plan(&self, source: &Path) -> Result<Placement> {
        if !source.is_file() {
            return Err(MoverError::io(
                source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "source file not found"),
            ));
        }
        self.plan(source)
    }

    /// Apply collision avoidance, the per-destination policy and source
    /// retention. Filesystem changes happen only when `execute` is set.
    fn place(&self, placement: Placement, execute: bool) -> FileOutcome {
        let source = placement.source.as_path();
        let total = placement.destinations.len();
        let colliding = placement.collisions.len();

        if self
            .config
            .collision_avoidance_behavior()
            .should_cancel(colliding, total)
        {
            if execute {
                info!(
                    "Cancelled {}: {} of {} destinations collide ({})",
                    source.display(),
                    colliding,
                    total,
                    self.config.collision_avoidance_behavior()
                );
            }
            return FileOutcome::Cancelled {
                collisions: placement.collisions,
            };
        }

        // A destination that is the source itself must never be truncated,
        // and the source is then the only copy left
        let targets_source = placement
            .collisions
            .iter()
            .any(|c| fs_ops::same_file(source, c));

        let mut written = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();

        for dest in &placement.destinations {
            let collides = placement.collides(dest);
            if collides
                && self.config.destination_collision_behavior() == DestinationCollision::Ignore
            {
                if execute {
                    warn!("{} already exists, skipping", dest.display());
                }
                skipped.push(dest.clone());
                continue;
            }

            if collides && targets_source && fs_ops::same_file(source, dest) {
                if execute {
                    error!("Refusing to copy {} onto itself", source.display());
                }
                failed.push(dest.clone());
                continue;
            }

            if !execute {
                written.push(dest.clone());
                continue;
            }

            match fs_ops::copy_with_metadata(source, dest) {
                Ok(()) => {
                    if collides {
                        info!("Overwrote {} with {}", dest.display(), source.display());
                    } else {
                        info!("Copied {} -> {}", source.display(), dest.display());
                    }
                    written.push(dest.clone());
                }
                Err(e) => {
                    error!("Failed to copy {} -> {}: {}", source.display(), dest.display(), e);
                    failed.push(dest.clone());
                }
            }
        }

        let delete = self
            .config
            .keep_source_behavior()
            .should_delete(colliding, total);

        let mut source_removed = false;
        if delete && targets_source {
            if execute {
                warn!(
                    "Keeping source {}: it is also one of the destinations",
                    source.display()
                );
            }
        } else if delete && !execute {
            source_removed = true;
        } else if delete {
            match fs_ops::remove_source(source) {
                Ok(()) => {
                    info!("Removed source file {}", source.display());
                    source_removed = true;
                }
                Err(e) => error!("Failed to remove source {}: {}", source.display(), e),
            }
        } else if execute {
            debug!(
                "Keeping source {} ({})",
                source.display(),
                self.config.keep_source_behavior()
            );
        }

        FileOutcome::Placed {
            written,
            skipped,
            failed,
            source_removed,
        }
    }

    /// Route every matched file. Per-file failures are logged and the run
    /// continues with the next file.
    pub fn move_files(&self) -> RunSummary {
        info!("Starting mover {}", self.config);
        let mut summary = RunSummary::default();

        for source in self.candidates() {
            summary.matched += 1;
            info!("File {} matched on mover {}", source.display(), self.config.name());

            match self.process_file(&source) {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!("Skipping {}: {}", source.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Mover {} finished: {} matched, {} placed, {} cancelled, {} failed",
            self.config.name(),
            summary.matched,
            summary.placed,
            summary.cancelled,
            summary.failed
        );
        summary
    }
}
