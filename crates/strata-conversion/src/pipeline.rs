//! The `to-ll` pipeline.

use crate::passes::{
    EmitLazyRegions, FnArgsToAlloca, HlToLlArith, HlToLlCf, HlToLlFunc, HlToLlGeps, HlToLlVars,
    LowerValueCategories,
};
use strata_core::pass::{compose, pass, PipelineStep};
use strata_hl::pipeline::stdtypes;

pub fn hl_to_ll_func() -> PipelineStep {
    pass(|| Box::new(HlToLlFunc))
}

pub fn hl_to_ll_vars() -> PipelineStep {
    pass(|| Box::new(HlToLlVars))
}

pub fn hl_to_ll_cf() -> PipelineStep {
    pass(|| Box::new(HlToLlCf))
}

pub fn hl_to_ll_geps() -> PipelineStep {
    pass(|| Box::new(HlToLlGeps))
}

pub fn fn_args_to_alloca() -> PipelineStep {
    pass(|| Box::new(FnArgsToAlloca))
}

/// Consumes the `hl.initialize` ops left by `hl-to-ll-vars`, and needs lvalue arguments spilled
/// before their types turn into pointers.
pub fn lower_value_categories() -> PipelineStep {
    pass(|| Box::new(LowerValueCategories))
        .depends_on(hl_to_ll_vars)
        .depends_on(fn_args_to_alloca)
}

pub fn lazy_regions() -> PipelineStep {
    pass(|| Box::new(EmitLazyRegions))
}

pub fn hl_to_ll_arith() -> PipelineStep {
    pass(|| Box::new(HlToLlArith))
}

/// Lowers a program in standard types to the `ll` dialect with llvm types.
///
/// The converter rejects `hl` scalar types, so the pipeline pulls in `stdtypes` first. Apart from
/// the edges declared by `lower_value_categories`, the order of the other passes comes from this
/// composite alone; they only touch the operations they rewrite.
pub fn to_ll() -> PipelineStep {
    compose(
        "to-ll",
        &[
            hl_to_ll_func,
            hl_to_ll_vars,
            hl_to_ll_cf,
            hl_to_ll_geps,
            fn_args_to_alloca,
            lower_value_categories,
            lazy_regions,
            hl_to_ll_arith,
        ],
    )
    .depends_on(stdtypes)
}
