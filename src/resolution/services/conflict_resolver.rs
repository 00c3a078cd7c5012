use crate::resolution::domain::{ArtifactKey, ArtifactPattern, Dependency, DependencyNode, Scope};
use crate::resolution::policies::DependencySelector;
use std::collections::{HashMap, VecDeque};

/// One winning artifact of a resolved dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    /// The winning edge, with its effective (mediated) scope
    pub dependency: Dependency,
    /// 1 for the root's own dependencies
    pub depth: usize,
    /// Exclusions in force below this node, its own included
    pub exclusions: Vec<ArtifactPattern>,
    /// Child-index path from the root to the winning node in the raw tree
    pub path: Vec<usize>,
    /// Keys of children that won their own conflicts
    pub children: Vec<ArtifactKey>,
}

impl ResolvedNode {
    pub fn key(&self) -> &ArtifactKey {
        self.dependency.key()
    }

    pub fn is_direct(&self) -> bool {
        self.depth == 1
    }
}

struct Pending<'a> {
    node: &'a DependencyNode,
    path: Vec<usize>,
    depth: usize,
    parent: Option<(usize, Scope)>,
    exclusions: Vec<ArtifactPattern>,
}

/// ConflictResolver service flattening a raw tree into one node per artifact key
///
/// The tree is walked breadth-first in declaration order. Edges the selector
/// rejects are pruned with their subtree. The first occurrence of a key wins,
/// which means nearest depth first and first declaration among equals. Losing
/// occurrences are not expanded.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Resolves the dependencies below `root`.
    ///
    /// # Arguments
    /// * `root` - Raw tree; the root itself is not part of the result
    /// * `selector` - Edge selection rules
    ///
    /// # Returns
    /// Winning nodes in breadth-first order, unique by key
    pub fn resolve(root: &DependencyNode, selector: &DependencySelector) -> Vec<ResolvedNode> {
        let mut resolved: Vec<ResolvedNode> = Vec::new();
        let mut winners: HashMap<ArtifactKey, usize> = HashMap::new();
        let mut queue: VecDeque<Pending> = VecDeque::new();

        let root_exclusions = root.dependency().exclusions().to_vec();
        for (i, child) in root.children().iter().enumerate() {
            queue.push_back(Pending {
                node: child,
                path: vec![i],
                depth: 1,
                parent: None,
                exclusions: root_exclusions.clone(),
            });
        }

        while let Some(pending) = queue.pop_front() {
            let declared = pending.node.dependency();
            if !selector.select(declared, pending.depth, &pending.exclusions) {
                continue;
            }
            if winners.contains_key(declared.key()) {
                continue;
            }

            let scope = match pending.parent {
                Some((_, parent_scope)) => parent_scope.inherit(declared.scope()),
                None => declared.scope(),
            };
            let mut dependency = declared.clone();
            dependency.set_scope(scope);

            let mut exclusions = pending.exclusions;
            for pattern in declared.exclusions() {
                if !exclusions.contains(pattern) {
                    exclusions.push(pattern.clone());
                }
            }

            let index = resolved.len();
            winners.insert(declared.key().clone(), index);
            if let Some((parent_index, _)) = pending.parent {
                resolved[parent_index].children.push(declared.key().clone());
            }

            for (i, child) in pending.node.children().iter().enumerate() {
                let mut path = pending.path.clone();
                path.push(i);
                queue.push_back(Pending {
                    node: child,
                    path,
                    depth: pending.depth + 1,
                    parent: Some((index, scope)),
                    exclusions: exclusions.clone(),
                });
            }

            resolved.push(ResolvedNode {
                dependency,
                depth: pending.depth,
                exclusions,
                path: pending.path,
                children: Vec::new(),
            });
        }

        resolved
    }
}
