use crate::types::FloatKind;
use serde::{Deserialize, Serialize};

/// What the pass manager does after a pass reports errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop after the first pass that reported an error.
    HaltOnError,
    /// Keep running to surface as many independent errors as possible.
    #[default]
    Continue,
}

/// Handler set registered in the type converter used by lowering passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConverterProfile {
    Default,
    /// Additionally converts records and elaborated types.
    #[default]
    Full,
}

/// Bit widths of the C scalar types on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetInfo {
    pub char_width: u16,
    pub short_width: u16,
    pub int_width: u16,
    pub long_width: u16,
    pub long_long_width: u16,
    pub int128_width: u16,
    pub pointer_width: u16,
    pub long_double: FloatKind,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self {
            char_width: 8,
            short_width: 16,
            int_width: 32,
            long_width: 64,
            long_long_width: 64,
            int128_width: 128,
            pointer_width: 64,
            long_double: FloatKind::F80,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineOptions {
    pub failure_policy: FailurePolicy,
    pub profile: ConverterProfile,
    pub statistics: bool,
    pub target: TargetInfo,
}

impl PipelineOptions {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_profile(mut self, profile: ConverterProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics = enabled;
        self
    }
}
