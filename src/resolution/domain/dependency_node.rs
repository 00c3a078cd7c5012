use crate::resolution::domain::{ArtifactCoords, Dependency, Scope};

/// A node of the raw, unresolved dependency tree.
///
/// The same artifact key may occur many times in the tree, at different depths
/// and with different versions. Depth, inherited exclusions and effective scope
/// are derived while walking the tree, not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    dependency: Dependency,
    children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn new(dependency: Dependency) -> Self {
        Self {
            dependency,
            children: Vec::new(),
        }
    }

    /// Root node for the artifact whose dependencies are being resolved.
    pub fn root(coords: ArtifactCoords) -> Self {
        Self::new(Dependency::new(coords, Scope::Compile))
    }

    pub fn with_children(mut self, children: Vec<DependencyNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: DependencyNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: DependencyNode) {
        self.children.push(child);
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn coords(&self) -> &ArtifactCoords {
        self.dependency.coords()
    }

    pub fn children(&self) -> &[DependencyNode] {
        &self.children
    }

    /// Follows a child-index path from this node.
    pub fn node_at(&self, path: &[usize]) -> Option<&DependencyNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut DependencyNode> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DependencyNode::node_count).sum::<usize>()
    }
}
