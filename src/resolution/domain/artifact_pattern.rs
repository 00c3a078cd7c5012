use crate::resolution::domain::{ArtifactCoords, ArtifactKey};
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a pattern string
const MAX_PATTERN_LENGTH: usize = 512;

/// A pattern over artifact coordinates, used for dependency exclusions and
/// for the `excluded-artifacts` list of extension descriptors.
///
/// Accepted forms:
/// - `artifactId` matches that artifact in any group
/// - `group:artifact` with optional `:classifier`, `:type` and `:version` segments
/// - any segment may be `*` or `**` (anything) or contain `*` globs
///
/// Segments left out at the end match anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactPattern {
    original: String,
    group: SegmentMatcher,
    artifact: SegmentMatcher,
    classifier: SegmentMatcher,
    artifact_type: SegmentMatcher,
    version: SegmentMatcher,
}

impl ArtifactPattern {
    /// Pattern excluding exactly `group:artifact` (any classifier, type, version).
    pub fn exact(group_id: &str, artifact_id: &str) -> Self {
        Self {
            original: format!("{}:{}", group_id, artifact_id),
            group: SegmentMatcher::compile(group_id),
            artifact: SegmentMatcher::compile(artifact_id),
            classifier: SegmentMatcher::Any,
            artifact_type: SegmentMatcher::Any,
            version: SegmentMatcher::Any,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn matches_key(&self, key: &ArtifactKey) -> bool {
        self.group.matches(key.group_id())
            && self.artifact.matches(key.artifact_id())
            && self.classifier.matches(key.classifier())
            && self.artifact_type.matches(key.artifact_type())
    }

    pub fn matches(&self, coords: &ArtifactCoords) -> bool {
        self.matches_key(coords.key()) && self.version.matches(coords.version())
    }
}

impl FromStr for ArtifactPattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let pattern = s.trim();
        validate_pattern(pattern)?;

        let parts: Vec<&str> = pattern.split(':').collect();
        if parts.len() > 5 {
            anyhow::bail!(
                "Artifact pattern '{}' has more than five segments (group:artifact:classifier:type:version)",
                pattern
            );
        }

        let segment = |i: usize| -> SegmentMatcher {
            parts
                .get(i)
                .map(|p| SegmentMatcher::compile(p))
                .unwrap_or(SegmentMatcher::Any)
        };

        let (group, artifact) = if parts.len() == 1 {
            (SegmentMatcher::Any, SegmentMatcher::compile(parts[0]))
        } else {
            if parts[0].is_empty() || parts[1].is_empty() {
                anyhow::bail!(
                    "Artifact pattern '{}' must name a group and an artifact",
                    pattern
                );
            }
            (segment(0), segment(1))
        };

        Ok(Self {
            original: pattern.to_string(),
            group,
            artifact,
            classifier: segment(2),
            artifact_type: segment(3),
            version: segment(4),
        })
    }
}

impl TryFrom<String> for ArtifactPattern {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ArtifactPattern> for String {
    fn from(pattern: ArtifactPattern) -> Self {
        pattern.original
    }
}

impl fmt::Display for ArtifactPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Matcher for one coordinate segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentMatcher {
    /// `*` or `**`
    Any,
    /// No wildcard
    Exact(String),
    /// `prefix*`
    Prefix(String),
    /// `*suffix`
    Suffix(String),
    /// `*middle*`
    Contains(String),
    /// Anything else: anchored first and last parts, ordered middle parts
    Glob {
        first: String,
        middle: Vec<String>,
        last: String,
    },
}

impl SegmentMatcher {
    fn compile(segment: &str) -> Self {
        if !segment.is_empty() && segment.chars().all(|c| c == '*') {
            return SegmentMatcher::Any;
        }
        let wildcards = segment.matches('*').count();
        if wildcards == 0 {
            return SegmentMatcher::Exact(segment.to_string());
        }
        if wildcards == 1 {
            if let Some(rest) = segment.strip_suffix('*') {
                return SegmentMatcher::Prefix(rest.to_string());
            }
            if let Some(rest) = segment.strip_prefix('*') {
                return SegmentMatcher::Suffix(rest.to_string());
            }
        }
        if wildcards == 2 && segment.starts_with('*') && segment.ends_with('*') {
            return SegmentMatcher::Contains(segment[1..segment.len() - 1].to_string());
        }

        let mut parts: Vec<String> = segment.split('*').map(str::to_string).collect();
        let last = parts.pop().unwrap_or_default();
        let first = if parts.is_empty() {
            String::new()
        } else {
            parts.remove(0)
        };
        let middle = parts.into_iter().filter(|p| !p.is_empty()).collect();
        SegmentMatcher::Glob {
            first,
            middle,
            last,
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            SegmentMatcher::Any => true,
            SegmentMatcher::Exact(s) => value == s,
            SegmentMatcher::Prefix(p) => value.starts_with(p.as_str()),
            SegmentMatcher::Suffix(s) => value.ends_with(s.as_str()),
            SegmentMatcher::Contains(m) => value.contains(m.as_str()),
            SegmentMatcher::Glob {
                first,
                middle,
                last,
            } => {
                if value.len() < first.len() + last.len()
                    || !value.starts_with(first.as_str())
                    || !value.ends_with(last.as_str())
                {
                    return false;
                }
                let mut rest = &value[first.len()..value.len() - last.len()];
                for part in middle {
                    match rest.find(part.as_str()) {
                        Some(pos) => rest = &rest[pos + part.len()..],
                        None => return false,
                    }
                }
                true
            }
        }
    }
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        anyhow::bail!("Artifact pattern cannot be empty");
    }
    if pattern.len() > MAX_PATTERN_LENGTH {
        anyhow::bail!(
            "Artifact pattern is too long ({} chars). Maximum: {} chars",
            pattern.len(),
            MAX_PATTERN_LENGTH
        );
    }
    if let Some(c) = pattern
        .chars()
        .find(|c| c.is_whitespace() || *c == '/' || *c == '\\')
    {
        anyhow::bail!(
            "Artifact pattern '{}' contains invalid character '{}'",
            pattern,
            c.escape_default()
        );
    }
    Ok(())
}
