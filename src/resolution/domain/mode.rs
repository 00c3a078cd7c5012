use serde::{Deserialize, Serialize};

/// Which application the model is being built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Production build (default)
    #[default]
    Prod,
    /// Dev mode: workspace modules may be reloadable
    Dev,
    /// Test: direct test-scoped dependencies are included
    Test,
}

impl ResolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMode::Prod => "prod",
            ResolutionMode::Dev => "dev",
            ResolutionMode::Test => "test",
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, ResolutionMode::Dev)
    }
}

impl std::str::FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prod" | "normal" => Ok(ResolutionMode::Prod),
            "dev" => Ok(ResolutionMode::Dev),
            "test" => Ok(ResolutionMode::Test),
            _ => Err(format!(
                "Invalid mode: {}. Please specify 'prod', 'dev' or 'test'",
                s
            )),
        }
    }
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
