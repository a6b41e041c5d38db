//! The page selection and transformation engine.
//!
//! An [`Engine`] drives one run through a fixed sequence of states:
//!
//! ```text
//! Idle -> Parsing -> Resolving -> PlanBuilt -> Executing -> Done
//! ```
//!
//! Any error moves it to `Failed`. `Done` and `Failed` are terminal, and
//! source documents are closed as soon as either is reached.
//!
//! # Examples
//!
//! ```no_run
//! use pagewielder::engine::Engine;
//!
//! # fn example() -> pagewielder::Result<()> {
//! let mut engine = Engine::new();
//! engine.parse(["a.pdf@1-3", "b.pdf@end@r90"])?;
//! engine.build_plan()?;
//! let execution = engine.execute()?;
//! println!("{} pages", execution.statistics.pages_written);
//! # Ok(())
//! # }
//! ```

pub mod executor;
pub mod index;
pub mod plan;
pub mod range;

pub use executor::{Execution, ExecutionStatistics, PlanExecutor};
pub use index::{DocumentId, DocumentIndex, DocumentSet, PageReference};
pub use plan::{OperationSpec, Plan, PlanEntry, PlanSummary, Rotation, Transform, build_plan};
pub use range::{PageBound, PageRange, PageSelection};

use lopdf::Document;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{PageWielderError, Result};

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EngineState {
    /// Nothing has happened yet.
    Idle,
    /// Operation specs are being collected.
    Parsing,
    /// Specs are being resolved against their documents.
    Resolving,
    /// A plan exists and can be executed.
    PlanBuilt,
    /// The output document is being assembled.
    Executing,
    /// The run succeeded.
    Done,
    /// The run failed.
    Failed,
}

impl EngineState {
    /// `Done` and `Failed` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        use EngineState::*;

        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, Parsing)
            | (Parsing, Resolving)
            | (Resolving, PlanBuilt)
            | (PlanBuilt, Executing)
            | (Executing, Done) => true,
            _ => false,
        }
    }
}

/// Runs operation specs through parsing, planning and execution.
#[derive(Debug)]
pub struct Engine {
    state: EngineState,
    documents: DocumentSet,
    specs: Vec<OperationSpec>,
    plan: Option<Plan>,
    executor: PlanExecutor,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an idle engine.
    pub fn new() -> Self {
        Self {
            state: EngineState::Idle,
            documents: DocumentSet::new(),
            specs: Vec::new(),
            plan: None,
            executor: PlanExecutor::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The documents of this run.
    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    /// Specs collected so far.
    pub fn specs(&self) -> &[OperationSpec] {
        &self.specs
    }

    /// The plan, once built and until executed.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Dry-run view of the plan, once built and until executed.
    pub fn plan_summary(&self) -> Option<PlanSummary> {
        self.plan.as_ref().map(|plan| plan.summary(&self.documents))
    }

    /// Make an in-memory document available under `path`.
    pub fn insert_document(&mut self, path: &Path, document: Document) -> DocumentId {
        self.documents.insert_document(path, document)
    }

    /// Parse command-line operation specs (`PATH[@PAGES[@TRANSFORM]]`).
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed: Result<Vec<OperationSpec>> = args
            .into_iter()
            .map(|arg| OperationSpec::parse(arg.as_ref()))
            .collect();

        match parsed {
            Ok(specs) => self.add_specs(specs),
            Err(err) => {
                if self.state == EngineState::Idle {
                    self.transition(EngineState::Parsing)?;
                }
                Err(self.fail(err))
            }
        }
    }

    /// Add already parsed specs. May be called repeatedly before planning.
    pub fn add_specs(&mut self, specs: impl IntoIterator<Item = OperationSpec>) -> Result<()> {
        if self.state == EngineState::Idle {
            self.transition(EngineState::Parsing)?;
        } else if self.state != EngineState::Parsing {
            return Err(PageWielderError::InvalidTransition {
                from: self.state,
                to: EngineState::Parsing,
            });
        }

        let before = self.specs.len();
        self.specs.extend(specs);
        debug!(added = self.specs.len() - before, total = self.specs.len(), "specs added");
        Ok(())
    }

    /// Resolve the collected specs into a plan.
    pub fn build_plan(&mut self) -> Result<&Plan> {
        self.transition(EngineState::Resolving)?;

        match build_plan(&self.specs, &mut self.documents) {
            Ok(plan) => {
                self.transition(EngineState::PlanBuilt)?;
                Ok(self.plan.insert(plan))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Execute the plan and close every source document.
    pub fn execute(&mut self) -> Result<Execution> {
        self.transition(EngineState::Executing)?;

        let Some(plan) = self.plan.take() else {
            return Err(self.fail(PageWielderError::execution("no plan to execute")));
        };

        match self.executor.execute(&plan, &mut self.documents) {
            Ok(execution) => {
                self.transition(EngineState::Done)?;
                self.documents.close_all();
                Ok(execution)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Parse, plan and execute in one call.
    pub fn run(&mut self, specs: impl IntoIterator<Item = OperationSpec>) -> Result<Execution> {
        self.add_specs(specs)?;
        self.build_plan()?;
        self.execute()
    }

    fn transition(&mut self, to: EngineState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(PageWielderError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        debug!(from = ?self.state, to = ?to, "engine transition");
        self.state = to;
        Ok(())
    }

    fn fail(&mut self, err: PageWielderError) -> PageWielderError {
        warn!(state = ?self.state, error = %err, "engine run failed");
        self.state = EngineState::Failed;
        self.plan = None;
        self.documents.close_all();
        err
    }
}
