use crate::resolution::domain::{ArtifactKey, DependencyFlags, ResolvedDependency};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// ReloadableModules service marking the workspace modules dev mode may reload
///
/// A workspace module is reloadable when it is not an extension and every
/// artifact on its path from the application is itself reloadable. An artifact
/// that anything non-reloadable depends on can never be reloaded, so the flag
/// is then cleared for its whole dependency closure.
pub struct ReloadableModules;

impl ReloadableModules {
    /// Sets `RELOADABLE` on qualifying dependencies.
    ///
    /// # Arguments
    /// * `dependencies` - Resolved dependencies with their direct dependency lists
    /// * `direct_keys` - Keys of the application's own dependencies
    ///
    /// # Returns
    /// The keys left reloadable
    pub fn apply(
        dependencies: &mut [ResolvedDependency],
        direct_keys: &[ArtifactKey],
    ) -> BTreeSet<ArtifactKey> {
        let index: HashMap<ArtifactKey, usize> = dependencies
            .iter()
            .enumerate()
            .map(|(i, d)| (d.key().clone(), i))
            .collect();
        let candidate = |d: &ResolvedDependency| {
            d.is_flag_set(DependencyFlags::WORKSPACE_MODULE)
                && d.is_runtime_cp()
                && !d.is_runtime_extension()
        };

        let mut reloadable: HashSet<ArtifactKey> = HashSet::new();
        let mut queue: VecDeque<&ArtifactKey> = direct_keys.iter().collect();
        while let Some(key) = queue.pop_front() {
            let Some(&i) = index.get(key) else {
                continue;
            };
            let dep = &dependencies[i];
            if !candidate(dep) || !reloadable.insert(key.clone()) {
                continue;
            }
            for child in dep.dependencies() {
                queue.push_back(child.key());
            }
        }

        let mut cleared: HashSet<ArtifactKey> = HashSet::new();
        let mut stack: Vec<ArtifactKey> = dependencies
            .iter()
            .filter(|d| !reloadable.contains(d.key()))
            .flat_map(|d| d.dependencies().iter().map(|c| c.key().clone()))
            .collect();
        while let Some(key) = stack.pop() {
            if !cleared.insert(key.clone()) {
                continue;
            }
            if let Some(&i) = index.get(&key) {
                stack.extend(dependencies[i].dependencies().iter().map(|c| c.key().clone()));
            }
        }
        reloadable.retain(|k| !cleared.contains(k));

        for dep in dependencies.iter_mut() {
            if reloadable.contains(dep.key()) {
                dep.set_flags(DependencyFlags::RELOADABLE);
            } else {
                dep.clear_flags(DependencyFlags::RELOADABLE);
            }
        }
        reloadable.into_iter().collect()
    }
}
