/*! Passes and the machinery that runs them.
 *
 * Passes are scheduled through the step graph in [`step`], which flattens named pipelines into a
 * [`PassPlan`]. The [`PassManager`] executes a plan over one module, strictly in order, applying
 * the configured failure policy between passes.
 */

mod options;
mod step;

pub use options::{ConverterProfile, FailurePolicy, PipelineOptions, TargetInfo};
pub use step::{compose, pass, PassFactory, PassPlan, PipelineStep, PlannedPass, StepBuilder, StepKind};

use crate::diagnostics::{Diagnostics, Severity};
use crate::ir::Module;
use crate::type_context::TypeContext;
use anyhow::Result;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("dependency cycle through pipeline step `{0}`")]
    Cycle(String),
    #[error("unknown pipeline `{0}`")]
    UnknownPipeline(String),
    #[error("lowering to `{0}` is not supported")]
    UnsupportedTarget(String),
    #[error("pass `{pass}` failed: {message}")]
    PassFailed { pass: String, message: String },
}

pub trait Pass {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn run_on_module(&mut self, module: &mut Module, ctx: &mut PassContext) -> Result<()>;

    fn modifies_ir(&self) -> bool {
        true
    }
}

/// State shared by the passes of one pipeline run over one module.
#[derive(Debug, Default)]
pub struct PassContext {
    pub options: PipelineOptions,
    pub diagnostics: Diagnostics,
    /// Identified structs and layouts created by lowering passes.
    pub types: TypeContext,
}

impl PassContext {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::new(),
            types: TypeContext::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PassStatistics {
    pub name: String,
    pub duration: Duration,
    pub diagnostics: usize,
}

/// Outcome of running a plan.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub passes_run: Vec<&'static str>,
    /// Pass after which execution stopped because of reported errors.
    pub halted_after: Option<&'static str>,
}

pub struct PassManager {
    plan: PassPlan,
    statistics: Vec<PassStatistics>,
    collect_stats: bool,
}

impl PassManager {
    pub fn new(plan: PassPlan) -> Self {
        Self {
            plan,
            statistics: Vec::new(),
            collect_stats: false,
        }
    }

    pub fn enable_statistics(&mut self) {
        self.collect_stats = true;
    }

    pub fn plan(&self) -> &PassPlan {
        &self.plan
    }

    /// Runs every planned pass in order.
    ///
    /// A pass returning an error stops the run with [`PipelineError::PassFailed`]. A pass that only
    /// reports diagnostics stops the run when a fatal one was reported, or when any error was
    /// reported under [`FailurePolicy::HaltOnError`].
    #[tracing::instrument(level = "debug", skip_all, fields(module = %module.name))]
    pub fn run(
        &mut self,
        module: &mut Module,
        ctx: &mut PassContext,
    ) -> std::result::Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();

        for planned in self.plan.passes() {
            let mut pass = (planned.factory)();
            let span = tracing::debug_span!("pass", name = planned.name);
            let _enter = span.enter();

            let reported_before = ctx.diagnostics.len();
            let errors_before = ctx.diagnostics.error_count();
            let start = self.collect_stats.then(Instant::now);

            tracing::debug!(description = pass.description(), "running pass");
            pass.run_on_module(module, ctx)
                .map_err(|err| PipelineError::PassFailed {
                    pass: planned.name.to_string(),
                    message: format!("{:#}", err),
                })?;
            summary.passes_run.push(planned.name);

            if let Some(start) = start {
                self.statistics.push(PassStatistics {
                    name: planned.name.to_string(),
                    duration: start.elapsed(),
                    diagnostics: ctx.diagnostics.len() - reported_before,
                });
            }

            let new_errors = ctx.diagnostics.error_count() - errors_before;
            let fatal = ctx
                .diagnostics
                .iter()
                .skip(reported_before)
                .any(|d| d.severity == Severity::Fatal);
            let halt = fatal
                || (new_errors > 0 && ctx.options.failure_policy == FailurePolicy::HaltOnError);
            if halt {
                tracing::debug!(errors = new_errors, fatal, "halting pipeline");
                summary.halted_after = Some(planned.name);
                break;
            }
        }

        Ok(summary)
    }

    pub fn statistics(&self) -> &[PassStatistics] {
        &self.statistics
    }
}
