/*! Pipeline steps and plan construction.
 *
 * A step is a single pass or a named composite of child steps; either kind may declare
 * prerequisites with `depends_on`. Steps are produced by plain `fn() -> PipelineStep` builders, so
 * the same step can be shared by any number of composites (and mutually dependent steps can be
 * written down at all, which is what the cycle check is for).
 *
 * Resolving a step walks prerequisites first, then the step itself (children in declared order for
 * composites). A step is identified by its name and placed at most once per plan.
 */

use super::{Pass, PipelineError};
use rustc_hash::FxHashSet;
use std::fmt;

pub type PassFactory = fn() -> Box<dyn Pass>;
pub type StepBuilder = fn() -> PipelineStep;

pub enum StepKind {
    Pass(PassFactory),
    Compose(Vec<StepBuilder>),
}

pub struct PipelineStep {
    name: &'static str,
    kind: StepKind,
    dependencies: Vec<StepBuilder>,
}

/// Leaf step running the pass built by `factory`. The step is named after the pass.
pub fn pass(factory: PassFactory) -> PipelineStep {
    PipelineStep {
        name: factory().name(),
        kind: StepKind::Pass(factory),
        dependencies: Vec::new(),
    }
}

/// Named group of steps, scheduled in the order given.
pub fn compose(name: &'static str, children: &[StepBuilder]) -> PipelineStep {
    PipelineStep {
        name,
        kind: StepKind::Compose(children.to_vec()),
        dependencies: Vec::new(),
    }
}

impl PipelineStep {
    /// Adds a prerequisite that is scheduled before this step and all of its children.
    pub fn depends_on(mut self, step: StepBuilder) -> Self {
        self.dependencies.push(step);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn dependencies(&self) -> &[StepBuilder] {
        &self.dependencies
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.kind, StepKind::Pass(_))
    }
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            StepKind::Pass(_) => "pass".to_string(),
            StepKind::Compose(children) => format!("compose[{}]", children.len()),
        };
        f.debug_struct("PipelineStep")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

#[derive(Clone, Copy)]
pub struct PlannedPass {
    pub name: &'static str,
    pub factory: PassFactory,
}

impl fmt::Debug for PlannedPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Flat, ordered, deduplicated list of passes.
///
/// Several steps may be added to one plan; anything already placed by an earlier step is not
/// placed again.
#[derive(Debug, Default)]
pub struct PassPlan {
    passes: Vec<PlannedPass>,
    visited: FxHashSet<&'static str>,
}

impl PassPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the plan of a single step.
    pub fn build(step: &PipelineStep) -> Result<Self, PipelineError> {
        let mut plan = Self::new();
        plan.add(step)?;
        Ok(plan)
    }

    /// Schedules `step` and everything it depends on.
    ///
    /// On a dependency cycle the plan is left unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(step = step.name))]
    pub fn add(&mut self, step: &PipelineStep) -> Result<(), PipelineError> {
        let mut staged = Vec::new();
        let mut visited = self.visited.clone();
        let mut in_progress = FxHashSet::default();
        schedule(step, &mut visited, &mut in_progress, &mut staged)?;

        tracing::debug!(added = staged.len(), "scheduled pipeline step");
        self.passes.extend(staged);
        self.visited = visited;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }

    pub fn passes(&self) -> &[PlannedPass] {
        &self.passes
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.passes.iter().position(|p| p.name == name)
    }
}

fn schedule(
    step: &PipelineStep,
    visited: &mut FxHashSet<&'static str>,
    in_progress: &mut FxHashSet<&'static str>,
    plan: &mut Vec<PlannedPass>,
) -> Result<(), PipelineError> {
    if visited.contains(step.name) {
        return Ok(());
    }
    if !in_progress.insert(step.name) {
        return Err(PipelineError::Cycle(step.name.to_string()));
    }

    for dependency in &step.dependencies {
        schedule(&dependency(), visited, in_progress, plan)?;
    }

    match &step.kind {
        StepKind::Pass(factory) => {
            tracing::trace!(pass = step.name, "placing pass");
            plan.push(PlannedPass {
                name: step.name,
                factory: *factory,
            });
        }
        StepKind::Compose(children) => {
            for child in children {
                schedule(&child(), visited, in_progress, plan)?;
            }
        }
    }

    in_progress.remove(step.name);
    visited.insert(step.name);
    Ok(())
}
