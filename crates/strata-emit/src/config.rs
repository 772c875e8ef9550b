use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub indent_style: IndentStyle,
    /// Print the trailing `: type` of operation results.
    pub include_types: bool,
    pub include_locations: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            indent_style: IndentStyle::Spaces(4),
            include_types: true,
            include_locations: false,
        }
    }
}

impl EmitterConfig {
    /// Uncolored output, as written to files and compared in tests.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EmitterConfig::from_json(r#"{ "use-colors": false, "indent-style": "tabs" }"#)
            .unwrap();
        assert!(!config.use_colors);
        assert_eq!(config.indent_style.unit(), "\t");
        assert!(config.include_types);
    }
}
