use crate::registry::PipelineRegistry;
use crate::target::TargetDialect;
use strata_core::data_layout::DataLayoutBlueprint;
use strata_core::diagnostics::Diagnostics;
use strata_core::ir::Module;
use strata_core::pass::{PassContext, PassManager, PassStatistics, PipelineError, PipelineOptions};

/// What a pipeline run did to a module.
#[derive(Debug)]
pub struct PipelineReport {
    pub passes_run: Vec<&'static str>,
    pub diagnostics: Diagnostics,
    /// Per-pass timings, empty unless statistics were requested.
    pub statistics: Vec<PassStatistics>,
    pub halted_after: Option<&'static str>,
    /// Layouts computed for converted types during the run.
    pub layout: DataLayoutBlueprint,
}

impl PipelineReport {
    pub fn halted(&self) -> bool {
        self.halted_after.is_some()
    }

    /// True when every planned pass ran and nothing reported an error.
    pub fn is_success(&self) -> bool {
        !self.halted() && !self.diagnostics.has_errors()
    }
}

/// Runs named pipelines over modules.
pub struct Driver {
    options: PipelineOptions,
    registry: PipelineRegistry,
}

impl Driver {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            registry: PipelineRegistry::with_defaults(),
        }
    }

    pub fn with_registry(options: PipelineOptions, registry: PipelineRegistry) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn registry(&self) -> &PipelineRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PipelineRegistry {
        &mut self.registry
    }

    /// Runs one registered pipeline.
    pub fn run_named(&self, module: &mut Module, name: &str) -> Result<PipelineReport, PipelineError> {
        self.run_pipelines(module, &[name])
    }

    /// Runs several registered pipelines as one plan: a pass shared between them runs once.
    #[tracing::instrument(level = "info", skip_all, fields(module = %module.name, pipelines = ?names))]
    pub fn run_pipelines(
        &self,
        module: &mut Module,
        names: &[&str],
    ) -> Result<PipelineReport, PipelineError> {
        let plan = self.registry.plan(names)?;
        tracing::debug!(passes = plan.len(), "planned pipeline");

        let mut manager = PassManager::new(plan);
        if self.options.statistics {
            manager.enable_statistics();
        }
        let mut ctx = PassContext::new(self.options.clone());
        let summary = manager.run(module, &mut ctx)?;

        let report = PipelineReport {
            passes_run: summary.passes_run,
            diagnostics: ctx.diagnostics,
            statistics: manager.statistics().to_vec(),
            halted_after: summary.halted_after,
            layout: ctx.types.blueprint(),
        };
        tracing::info!(
            passes = report.passes_run.len(),
            errors = report.diagnostics.error_count(),
            halted = report.halted(),
            "pipeline finished"
        );
        Ok(report)
    }

    /// Lowers `module` from the high-level dialect to `target`.
    pub fn lower_to(
        &self,
        module: &mut Module,
        target: TargetDialect,
    ) -> Result<PipelineReport, PipelineError> {
        let pipelines = target.pipelines()?;
        tracing::debug!(%target, "lowering");
        self.run_pipelines(module, pipelines)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}
