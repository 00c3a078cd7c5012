use crate::resolution::domain::{ArtifactCoords, ArtifactKey, ArtifactPattern};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maven dependency scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
    System,
    Import,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        }
    }

    /// Effective scope of a transitive dependency declared with `child` scope
    /// under a node whose effective scope is `self`.
    pub fn inherit(self, child: Scope) -> Scope {
        match (self, child) {
            (Scope::Compile, child) => child,
            (Scope::Runtime, Scope::Compile) => Scope::Runtime,
            (Scope::Test, Scope::Compile | Scope::Runtime) => Scope::Test,
            (Scope::Provided, Scope::Compile | Scope::Runtime) => Scope::Provided,
            (_, child) => child,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            "import" => Ok(Scope::Import),
            other => anyhow::bail!("Unknown dependency scope: {}", other),
        }
    }
}

/// A dependency edge: target coordinates plus how the edge was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    coords: ArtifactCoords,
    scope: Scope,
    optional: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exclusions: Vec<ArtifactPattern>,
}

impl Dependency {
    pub fn new(coords: ArtifactCoords, scope: Scope) -> Self {
        Self {
            coords,
            scope,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusion(mut self, pattern: ArtifactPattern) -> Self {
        self.exclusions.push(pattern);
        self
    }

    pub fn with_exclusions(mut self, patterns: impl IntoIterator<Item = ArtifactPattern>) -> Self {
        self.exclusions.extend(patterns);
        self
    }

    pub fn coords(&self) -> &ArtifactCoords {
        &self.coords
    }

    pub fn key(&self) -> &ArtifactKey {
        self.coords.key()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn exclusions(&self) -> &[ArtifactPattern] {
        &self.exclusions
    }

    pub fn set_coords(&mut self, coords: ArtifactCoords) {
        self.coords = coords;
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.coords, self.scope)?;
        if self.optional {
            write!(f, ", optional")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_str() {
        assert_eq!("".parse::<Scope>().unwrap(), Scope::Compile);
        assert_eq!("Runtime".parse::<Scope>().unwrap(), Scope::Runtime);
        assert_eq!("test".parse::<Scope>().unwrap(), Scope::Test);
        assert!("bogus".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_inheritance() {
        assert_eq!(Scope::Compile.inherit(Scope::Runtime), Scope::Runtime);
        assert_eq!(Scope::Runtime.inherit(Scope::Compile), Scope::Runtime);
        assert_eq!(Scope::Test.inherit(Scope::Compile), Scope::Test);
        assert_eq!(Scope::Provided.inherit(Scope::Runtime), Scope::Provided);
    }

    #[test]
    fn test_dependency_builder_style() {
        let coords: ArtifactCoords = "io.acme:required-transitive:1".parse().unwrap();
        let dep = Dependency::new(coords, Scope::Compile)
            .optional(true)
            .with_exclusion("io.acme:excluded-dep".parse().unwrap());
        assert!(dep.is_optional());
        assert_eq!(dep.exclusions().len(), 1);
        assert_eq!(
            dep.to_string(),
            "io.acme:required-transitive::jar:1 (compile, optional)"
        );
    }
}
