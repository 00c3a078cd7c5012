use crate::resolution::domain::{
    ArtifactCoords, ArtifactDescriptor, ArtifactKey, ArtifactPattern, CollectRequest, Dependency,
    DependencyNode, Scope,
};
use crate::shared::error::CuratorError;
use crate::shared::Result;
use anyhow::Context;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

struct Expansion {
    path: Vec<usize>,
    depth: usize,
    ancestors: Vec<ArtifactKey>,
    exclusions: Vec<ArtifactPattern>,
}

/// DependencyCollector service building the raw dependency tree of a request
///
/// The tree is expanded breadth-first. A node is expanded only when the
/// request's selector accepts its edge and its key has not been expanded
/// before; later occurrences stay in the tree as leaves so that conflict
/// resolution still sees them.
pub struct DependencyCollector;

impl DependencyCollector {
    /// Maximum tree depth, protecting against runaway or malicious descriptors
    pub const MAX_COLLECT_DEPTH: usize = 100;

    /// Collects the dependency tree described by `request`.
    ///
    /// # Arguments
    /// * `request` - Root, managed versions, exclusions and selection rules
    /// * `read_descriptor` - Reads the declared dependencies of an artifact
    ///
    /// # Errors
    /// - A descriptor cannot be read
    /// - A selected dependency's version is a range
    /// - The tree is deeper than `MAX_COLLECT_DEPTH`
    pub fn collect<F>(request: &CollectRequest, mut read_descriptor: F) -> Result<DependencyNode>
    where
        F: FnMut(&ArtifactCoords) -> Result<ArtifactDescriptor>,
    {
        let managed: HashMap<&ArtifactKey, &Dependency> = request
            .managed_dependencies
            .iter()
            .rev()
            .map(|d| (d.key(), d))
            .collect();

        let direct = match &request.root_dependencies {
            Some(deps) => deps.clone(),
            None => read_descriptor(&request.root)?.dependencies,
        };

        let mut root = DependencyNode::new(
            Dependency::new(request.root.clone(), Scope::Compile)
                .with_exclusions(request.exclusions.iter().cloned()),
        );
        let mut expanded: HashSet<ArtifactKey> = HashSet::new();
        let mut queue: VecDeque<Expansion> = VecDeque::new();

        Self::attach_children(
            &mut root,
            &Expansion {
                path: Vec::new(),
                depth: request.root_depth,
                ancestors: vec![request.root.key().clone()],
                exclusions: request.exclusions.clone(),
            },
            direct,
            &managed,
            request,
            &mut expanded,
            &mut queue,
        )?;

        while let Some(expansion) = queue.pop_front() {
            let Some(node) = root.node_at(&expansion.path) else {
                continue;
            };
            let coords = node.coords().clone();
            let descriptor = read_descriptor(&coords)
                .with_context(|| format!("Failed to collect dependencies of {}", coords))?;
            Self::attach_children(
                &mut root,
                &expansion,
                descriptor.dependencies,
                &managed,
                request,
                &mut expanded,
                &mut queue,
            )?;
        }

        Ok(root)
    }

    #[allow(clippy::too_many_arguments)]
    fn attach_children(
        root: &mut DependencyNode,
        parent: &Expansion,
        dependencies: Vec<Dependency>,
        managed: &HashMap<&ArtifactKey, &Dependency>,
        request: &CollectRequest,
        expanded: &mut HashSet<ArtifactKey>,
        queue: &mut VecDeque<Expansion>,
    ) -> Result<()> {
        let depth = parent.depth + 1;
        if depth > Self::MAX_COLLECT_DEPTH {
            anyhow::bail!(
                "Dependency tree of {} exceeds the maximum depth of {}",
                request.root,
                Self::MAX_COLLECT_DEPTH
            );
        }

        let Some(parent_node) = root.node_at_mut(&parent.path) else {
            return Ok(());
        };

        for mut dependency in dependencies {
            if depth > 1 {
                if let Some(pinned) = managed.get(dependency.key()) {
                    if pinned.coords().version() != dependency.coords().version() {
                        dependency.set_coords(pinned.coords().clone());
                    }
                }
            }
            if parent.ancestors.contains(dependency.key()) {
                debug!(
                    artifact = %dependency.coords(),
                    "dependency cycle cut"
                );
                continue;
            }
            if !request
                .selector
                .select(&dependency, depth, &parent.exclusions)
            {
                continue;
            }
            Self::check_version(dependency.coords())?;

            let index = parent_node.children().len();
            let expand = expanded.insert(dependency.key().clone());
            if expand {
                let mut path = parent.path.clone();
                path.push(index);
                let mut ancestors = parent.ancestors.clone();
                ancestors.push(dependency.key().clone());
                let mut exclusions = parent.exclusions.clone();
                for pattern in dependency.exclusions() {
                    if !exclusions.contains(pattern) {
                        exclusions.push(pattern.clone());
                    }
                }
                queue.push_back(Expansion {
                    path,
                    depth,
                    ancestors,
                    exclusions,
                });
            }
            parent_node.add_child(DependencyNode::new(dependency));
        }
        Ok(())
    }

    fn check_version(coords: &ArtifactCoords) -> Result<()> {
        let version = coords.version();
        if version.starts_with('[') || version.starts_with('(') || version.contains(',') {
            return Err(CuratorError::VersionRange {
                coords: coords.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
