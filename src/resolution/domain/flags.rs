use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit set describing how a resolved dependency participates in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyFlags(u32);

impl DependencyFlags {
    pub const NONE: Self = Self(0);
    pub const OPTIONAL: Self = Self(1);
    pub const DIRECT: Self = Self(1 << 1);
    pub const RUNTIME_CP: Self = Self(1 << 2);
    pub const DEPLOYMENT_CP: Self = Self(1 << 3);
    pub const RUNTIME_EXTENSION_ARTIFACT: Self = Self(1 << 4);
    pub const WORKSPACE_MODULE: Self = Self(1 << 5);
    pub const RELOADABLE: Self = Self(1 << 6);
    /// First extension met on a path from the root
    pub const TOP_LEVEL_RUNTIME_EXTENSION_ARTIFACT: Self = Self(1 << 7);
    pub const CLASSLOADER_PARENT_FIRST: Self = Self(1 << 8);
    pub const CLASSLOADER_RUNNER_PARENT_FIRST: Self = Self(1 << 9);
    pub const CLASSLOADER_LESSER_PRIORITY: Self = Self(1 << 10);
    pub const COMPILE_ONLY: Self = Self(1 << 11);

    const NAMES: [(Self, &'static str); 12] = [
        (Self::OPTIONAL, "optional"),
        (Self::DIRECT, "direct"),
        (Self::RUNTIME_CP, "runtime-cp"),
        (Self::DEPLOYMENT_CP, "deployment-cp"),
        (Self::RUNTIME_EXTENSION_ARTIFACT, "runtime-extension"),
        (Self::WORKSPACE_MODULE, "workspace-module"),
        (Self::RELOADABLE, "reloadable"),
        (Self::TOP_LEVEL_RUNTIME_EXTENSION_ARTIFACT, "top-level-extension"),
        (Self::CLASSLOADER_PARENT_FIRST, "parent-first"),
        (Self::CLASSLOADER_RUNNER_PARENT_FIRST, "runner-parent-first"),
        (Self::CLASSLOADER_LESSER_PRIORITY, "lesser-priority"),
        (Self::COMPILE_ONLY, "compile-only"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for DependencyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DependencyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for DependencyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut flags = DependencyFlags::RUNTIME_CP | DependencyFlags::DEPLOYMENT_CP;
        assert!(flags.contains(DependencyFlags::RUNTIME_CP));
        flags.set(DependencyFlags::RELOADABLE);
        assert!(flags.contains(DependencyFlags::RELOADABLE | DependencyFlags::RUNTIME_CP));
        flags.clear(DependencyFlags::RELOADABLE);
        assert!(!flags.contains(DependencyFlags::RELOADABLE));
        assert!(flags.intersects(DependencyFlags::DEPLOYMENT_CP | DependencyFlags::DIRECT));
    }

    #[test]
    fn test_display_names() {
        let flags = DependencyFlags::DIRECT | DependencyFlags::CLASSLOADER_PARENT_FIRST;
        assert_eq!(flags.to_string(), "direct,parent-first");
        assert_eq!(DependencyFlags::NONE.to_string(), "");
    }

    #[test]
    fn test_serializes_as_bits() {
        let flags = DependencyFlags::OPTIONAL | DependencyFlags::DIRECT;
        assert_eq!(serde_json::to_string(&flags).unwrap(), "3");
    }
}
