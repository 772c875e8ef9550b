//! Named high-level pipelines.

use crate::passes::{
    DeadCodeElimination, HlLowerTypes, HlToHlbi, LowerElaboratedTypes, LowerTypedefs,
    SpliceTrailingScopes, UnusedDeclElimination,
};
use strata_core::pass::{compose, pass, PipelineStep};

pub fn splice_trailing_scopes() -> PipelineStep {
    pass(|| Box::new(SpliceTrailingScopes))
}

/// Structural cleanup run before anything inspects block contents.
pub fn canonicalize() -> PipelineStep {
    compose("canonicalize", &[splice_trailing_scopes])
}

pub fn lower_elaborated_types() -> PipelineStep {
    pass(|| Box::new(LowerElaboratedTypes))
}

pub fn lower_typedefs() -> PipelineStep {
    pass(|| Box::new(LowerTypedefs))
}

/// Removes alias forms. Elaborated wrappers go first so typedef bodies are bare.
pub fn desugar() -> PipelineStep {
    compose("desugar", &[lower_typedefs]).depends_on(lower_elaborated_types)
}

pub fn dce() -> PipelineStep {
    pass(|| Box::new(DeadCodeElimination)).depends_on(canonicalize)
}

pub fn ude() -> PipelineStep {
    pass(|| Box::new(UnusedDeclElimination)).depends_on(canonicalize)
}

pub fn to_hlbi() -> PipelineStep {
    pass(|| Box::new(HlToHlbi))
}

pub fn simplify() -> PipelineStep {
    compose("simplify", &[to_hlbi, ude, dce, desugar])
}

/// Lowers `hl` scalars to builtin types.
pub fn stdtypes() -> PipelineStep {
    pass(|| Box::new(HlLowerTypes)).depends_on(desugar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::pass::PassPlan;

    #[test]
    fn test_simplify_plan_order() {
        let plan = PassPlan::build(&simplify()).unwrap();
        assert_eq!(
            plan.names(),
            vec![
                "hl-to-hlbi",
                "splice-trailing-scopes",
                "ude",
                "dce",
                "lower-elaborated-types",
                "lower-typedefs",
            ]
        );
    }

    #[test]
    fn test_stdtypes_runs_after_desugar() {
        let plan = PassPlan::build(&stdtypes()).unwrap();
        assert_eq!(
            plan.names(),
            vec!["lower-elaborated-types", "lower-typedefs", "hl-lower-types"]
        );
    }

    #[test]
    fn test_canonicalize_shared_by_dce_and_ude() {
        let mut plan = PassPlan::new();
        plan.add(&dce()).unwrap();
        plan.add(&ude()).unwrap();
        assert_eq!(plan.names(), vec!["splice-trailing-scopes", "dce", "ude"]);
    }
}
