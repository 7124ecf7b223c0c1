//! The inspection pipeline.
//!
//! Inspectors run in a fixed order over one shared repository. Each may add,
//! replace, or remove entries; later stages are allowed to retract what an
//! earlier stage produced (a framework-aware inspector removing the
//! front-controller entry it resolved). New variants are added by extending
//! the list the orchestrator builds, not by runtime registration. Each
//! inspector runs exactly once per repository.

use tracing::info;

use crate::error::Result;
use crate::paths::PathRepo;
use crate::warfile::Warfile;

pub trait Inspector {
    fn name(&self) -> &'static str;

    /// Examines the archive and mutates the repository. Inspectors never
    /// read each other's internal state; the repository is the only shared
    /// surface.
    fn inspect(&self, war: &Warfile, paths: &mut PathRepo) -> Result<()>;
}

/// Runs the ordered pipeline once over the repository.
pub fn run_inspectors(
    war: &Warfile,
    inspectors: &[Box<dyn Inspector>],
    paths: &mut PathRepo,
) -> Result<()> {
    for inspector in inspectors {
        info!("{} started", inspector.name());
        inspector.inspect(war, paths)?;
        info!("{} finished; repository holds {} url(s)", inspector.name(), paths.len());
    }
    Ok(())
}
