//! lnkr core - link registry and reconciliation engine.
//!
//! Keeps a per-project registry (`.lnkr.toml`) of paths that should be
//! hard- or symbolically linked between a local root and a remote root, then
//! creates, removes and checks those links.
//!
//! # Example
//!
//! ```rust,ignore
//! use lnkr_core::{AddRequest, LinkDirection, LinkKind, Lnkr};
//!
//! fn main() -> lnkr_core::Result<()> {
//!     let lnkr = Lnkr::new(std::env::current_dir()?);
//!
//!     lnkr.add(&AddRequest::new("config", LinkKind::Symbolic))?;
//!     let report = lnkr.link(LinkDirection::LocalToRemote)?;
//!     println!("Created {} links", report.created());
//!
//!     print!("{}", lnkr.status()?.render_table());
//!     Ok(())
//! }
//! ```

mod atomic;

pub mod config;
pub mod discovery;
pub mod error;
pub mod ledger;
pub mod materializer;
pub mod paths;
pub mod platform;
pub mod project;
pub mod registry;
pub mod status;

pub use discovery::{AddReport, AddRequest, CandidateWalk};
pub use error::{LnkrError, Result, RootKind};
pub use ledger::ExcludeLedger;
pub use materializer::{EntryOutcome, EntryResult, LinkDirection, LinkReport};
pub use project::{
    CleanReport, InitOptions, InitReport, LedgerUpdate, Project, RemoveReport,
};
pub use registry::{LinkEntry, LinkKind, Registry, RegistryStore};
pub use status::{LinkCheck, StatusReport, StatusRow};

use std::path::{Path, PathBuf};

/// Entry point for every lnkr operation on one project.
#[derive(Debug, Clone)]
pub struct Lnkr {
    project: Project,
}

impl Lnkr {
    /// Open the project rooted at `work_dir`. Nothing is read until an
    /// operation runs.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            project: Project::new(work_dir),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn registry(&self) -> Result<Registry> {
        self.project.load()
    }

    pub fn init(&self, options: &InitOptions) -> Result<InitReport> {
        project::init(&self.project, options)
    }

    pub fn add(&self, request: &AddRequest) -> Result<AddReport> {
        discovery::add(&self.project, request)
    }

    pub fn link(&self, direction: LinkDirection) -> Result<LinkReport> {
        materializer::link(&self.project, direction)
    }

    pub fn unlink(&self) -> Result<LinkReport> {
        materializer::unlink(&self.project)
    }

    pub fn status(&self) -> Result<StatusReport> {
        status::status(&self.project)
    }

    /// Forget `path` and everything registered beneath it.
    pub fn remove(&self, path: &Path) -> Result<RemoveReport> {
        project::remove(&self.project, path)
    }

    pub fn clean(&self) -> Result<CleanReport> {
        project::clean(&self.project)
    }
}
