use indexmap::IndexMap;
use strata_core::pass::{PassPlan, PipelineError, StepBuilder};

/// Pipelines a driver can run, by stable name.
#[derive(Clone)]
pub struct PipelineRegistry {
    pipelines: IndexMap<&'static str, StepBuilder>,
}

impl PipelineRegistry {
    pub fn empty() -> Self {
        Self {
            pipelines: IndexMap::new(),
        }
    }

    /// `canonicalize`, `desugar`, `simplify`, `stdtypes` and `to-ll`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("canonicalize", strata_hl::pipeline::canonicalize);
        registry.register("desugar", strata_hl::pipeline::desugar);
        registry.register("simplify", strata_hl::pipeline::simplify);
        registry.register("stdtypes", strata_hl::pipeline::stdtypes);
        registry.register("to-ll", strata_conversion::pipeline::to_ll);
        registry
    }

    /// Registers `builder` under `name`, replacing an earlier registration.
    pub fn register(&mut self, name: &'static str, builder: StepBuilder) {
        self.pipelines.insert(name, builder);
    }

    pub fn get(&self, name: &str) -> Option<StepBuilder> {
        self.pipelines.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pipelines.keys().copied()
    }

    /// One plan covering all `names`, each pass at most once.
    pub fn plan(&self, names: &[&str]) -> Result<PassPlan, PipelineError> {
        let mut plan = PassPlan::new();
        for name in names {
            let builder = self
                .get(name)
                .ok_or_else(|| PipelineError::UnknownPipeline(name.to_string()))?;
            plan.add(&builder())?;
        }
        Ok(plan)
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
