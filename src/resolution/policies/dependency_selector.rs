use crate::resolution::domain::{ArtifactPattern, Dependency, ResolutionMode, Scope};

/// DependencySelector policy deciding which edges of the dependency graph are followed
///
/// Rules, applied per edge:
/// 1. An edge whose target matches an exclusion inherited from its ancestors is dropped
/// 2. Optional edges are followed only from the root (depth 1)
/// 3. `test` and `provided` edges are followed only from the root
/// 4. At depth 1 only the configured scopes are followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySelector {
    direct_scopes: Vec<Scope>,
}

impl DependencySelector {
    /// Selector for the application's own direct dependencies in `mode`.
    pub fn for_mode(mode: ResolutionMode) -> Self {
        match mode {
            ResolutionMode::Prod | ResolutionMode::Dev => {
                Self::with_direct_scopes(vec![Scope::Compile, Scope::Runtime])
            }
            ResolutionMode::Test => {
                Self::with_direct_scopes(vec![Scope::Compile, Scope::Runtime, Scope::Test])
            }
        }
    }

    /// Selector for collecting compile-only (provided) direct dependencies.
    pub fn compile_only() -> Self {
        Self::with_direct_scopes(vec![Scope::Provided])
    }

    pub fn with_direct_scopes(direct_scopes: Vec<Scope>) -> Self {
        Self { direct_scopes }
    }

    pub fn direct_scopes(&self) -> &[Scope] {
        &self.direct_scopes
    }

    /// Decides whether the edge to `dependency`, found at `depth` (1 for the
    /// root's own dependencies), is followed.
    ///
    /// # Arguments
    /// * `dependency` - The declared edge
    /// * `depth` - Depth of the target node
    /// * `inherited_exclusions` - Exclusions declared on every ancestor edge
    pub fn select(
        &self,
        dependency: &Dependency,
        depth: usize,
        inherited_exclusions: &[ArtifactPattern],
    ) -> bool {
        if inherited_exclusions
            .iter()
            .any(|p| p.matches(dependency.coords()))
        {
            return false;
        }
        if depth <= 1 {
            return self.direct_scopes.contains(&dependency.scope());
        }
        if dependency.is_optional() {
            return false;
        }
        !matches!(
            dependency.scope(),
            Scope::Test | Scope::Provided | Scope::System | Scope::Import
        )
    }
}
