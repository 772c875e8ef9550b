use std::fmt;
use std::str::FromStr;
use strata_core::pass::PipelineError;

/// Dialect a module can be lowered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetDialect {
    HighLevel,
    Std,
    Llvm,
    Cir,
    Abi,
}

impl TargetDialect {
    pub fn parse(name: &str) -> Result<Self, PipelineError> {
        match name {
            "hl" => Ok(TargetDialect::HighLevel),
            "std" => Ok(TargetDialect::Std),
            "llvm" => Ok(TargetDialect::Llvm),
            "cir" => Ok(TargetDialect::Cir),
            "abi" => Ok(TargetDialect::Abi),
            other => Err(PipelineError::UnsupportedTarget(other.to_string())),
        }
    }

    /// Named pipelines that lower a freshly built module to this dialect.
    pub fn pipelines(self) -> Result<&'static [&'static str], PipelineError> {
        match self {
            TargetDialect::HighLevel => Ok(&["canonicalize"]),
            TargetDialect::Std => Ok(&["simplify", "stdtypes"]),
            TargetDialect::Llvm => Ok(&["simplify", "to-ll"]),
            TargetDialect::Cir | TargetDialect::Abi => {
                Err(PipelineError::UnsupportedTarget(self.to_string()))
            }
        }
    }
}

impl FromStr for TargetDialect {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetDialect::HighLevel => "hl",
            TargetDialect::Std => "std",
            TargetDialect::Llvm => "llvm",
            TargetDialect::Cir => "cir",
            TargetDialect::Abi => "abi",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_display_agree() {
        for name in ["hl", "std", "llvm", "cir", "abi"] {
            let target: TargetDialect = name.parse().unwrap();
            assert_eq!(target.to_string(), name);
        }
        assert!(TargetDialect::parse("wasm").is_err());
    }

    #[test]
    fn test_cir_and_abi_are_not_lowered() {
        let err = TargetDialect::Cir.pipelines().unwrap_err();
        assert_eq!(err.to_string(), "lowering to `cir` is not supported");
        assert!(TargetDialect::Abi.pipelines().is_err());
        assert_eq!(TargetDialect::Llvm.pipelines().unwrap(), &["simplify", "to-ll"]);
    }
}
