use crate::shared::error::CuratorError;
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const TYPE_JAR: &str = "jar";
pub const TYPE_POM: &str = "pom";

/// Maximum length of a single coordinate segment (security limit)
const MAX_SEGMENT_LENGTH: usize = 255;

/// Identity of an artifact across versions: `group:artifact:classifier:type`.
///
/// Two nodes with the same key but different versions are in conflict; after
/// resolution exactly one of them survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactKey {
    group_id: String,
    artifact_id: String,
    classifier: String,
    artifact_type: String,
}

impl ArtifactKey {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        classifier: impl Into<String>,
        artifact_type: impl Into<String>,
    ) -> Self {
        let artifact_type = artifact_type.into();
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: classifier.into(),
            artifact_type: if artifact_type.is_empty() {
                TYPE_JAR.to_string()
            } else {
                artifact_type
            },
        }
    }

    /// Key of a plain jar with no classifier.
    pub fn ga(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self::new(group_id, artifact_id, "", TYPE_JAR)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn artifact_type(&self) -> &str {
        &self.artifact_type
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.classifier, self.artifact_type
        )
    }
}

impl FromStr for ArtifactKey {
    type Err = anyhow::Error;

    /// Parses `g:a[:c[:t]]`; the type defaults to `jar`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(invalid(s, "expected group:artifact[:classifier[:type]]"));
        }
        validate_segment(s, "groupId", parts[0])?;
        validate_segment(s, "artifactId", parts[1])?;
        let classifier = parts.get(2).copied().unwrap_or("");
        let artifact_type = parts.get(3).copied().unwrap_or(TYPE_JAR);
        Ok(Self::new(parts[0], parts[1], classifier, artifact_type))
    }
}

impl TryFrom<String> for ArtifactKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ArtifactKey> for String {
    fn from(key: ArtifactKey) -> Self {
        key.to_string()
    }
}

/// Full artifact coordinates: `group:artifact:classifier:type:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactCoords {
    key: ArtifactKey,
    version: String,
}

impl ArtifactCoords {
    /// Creates validated coordinates.
    ///
    /// # Errors
    /// Returns `CuratorError::InvalidCoords` when a mandatory segment is empty,
    /// too long, or contains characters that cannot appear in a repository path.
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        classifier: &str,
        artifact_type: &str,
        version: &str,
    ) -> Result<Self> {
        let display = format!(
            "{}:{}:{}:{}:{}",
            group_id, artifact_id, classifier, artifact_type, version
        );
        validate_segment(&display, "groupId", group_id)?;
        validate_segment(&display, "artifactId", artifact_id)?;
        validate_segment(&display, "version", version)?;
        if !classifier.is_empty() {
            validate_segment(&display, "classifier", classifier)?;
        }
        if !artifact_type.is_empty() {
            validate_segment(&display, "type", artifact_type)?;
        }
        Ok(Self {
            key: ArtifactKey::new(group_id, artifact_id, classifier, artifact_type),
            version: version.to_string(),
        })
    }

    pub fn jar(group_id: &str, artifact_id: &str, version: &str) -> Result<Self> {
        Self::new(group_id, artifact_id, "", TYPE_JAR, version)
    }

    pub fn pom(group_id: &str, artifact_id: &str, version: &str) -> Result<Self> {
        Self::new(group_id, artifact_id, "", TYPE_POM, version)
    }

    /// Coordinates for a key at the given version.
    pub fn of_key(key: &ArtifactKey, version: &str) -> Result<Self> {
        Self::new(
            key.group_id(),
            key.artifact_id(),
            key.classifier(),
            key.artifact_type(),
            version,
        )
    }

    pub fn group_id(&self) -> &str {
        self.key.group_id()
    }

    pub fn artifact_id(&self) -> &str {
        self.key.artifact_id()
    }

    pub fn classifier(&self) -> &str {
        self.key.classifier()
    }

    pub fn artifact_type(&self) -> &str {
        self.key.artifact_type()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn is_jar(&self) -> bool {
        self.artifact_type() == TYPE_JAR
    }

    pub fn with_version(&self, version: &str) -> Result<Self> {
        Self::of_key(&self.key, version)
    }

    /// The POM of this artifact (same group, artifact and version).
    pub fn to_pom(&self) -> Result<Self> {
        Self::pom(self.group_id(), self.artifact_id(), &self.version)
    }

    /// `g:a:v` for plain jars, the full form otherwise.
    pub fn to_compact_string(&self) -> String {
        if self.classifier().is_empty() && self.is_jar() {
            format!("{}:{}:{}", self.group_id(), self.artifact_id(), self.version)
        } else {
            self.to_string()
        }
    }

    /// File extension used in the repository layout.
    pub fn extension(&self) -> &str {
        match self.artifact_type() {
            "jar" | "test-jar" | "maven-plugin" | "ejb" | "bundle" => "jar",
            other => other,
        }
    }

    /// Path relative to a Maven repository root.
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group_id().split('.').collect();
        path.push(self.artifact_id());
        path.push(&self.version);

        let classifier = match self.artifact_type() {
            "test-jar" if self.classifier().is_empty() => "tests",
            _ => self.classifier(),
        };
        let file_name = if classifier.is_empty() {
            format!("{}-{}.{}", self.artifact_id(), self.version, self.extension())
        } else {
            format!(
                "{}-{}-{}.{}",
                self.artifact_id(),
                self.version,
                classifier,
                self.extension()
            )
        };
        path.push(file_name);
        path
    }
}

impl fmt::Display for ArtifactCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.version)
    }
}

impl FromStr for ArtifactCoords {
    type Err = anyhow::Error;

    /// Parses `g:a[:c[:t]]:v`. The version follows the last colon.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let version_sep = s
            .rfind(':')
            .ok_or_else(|| invalid(s, "expected group:artifact[:classifier[:type]]:version"))?;
        let version = &s[version_sep + 1..];
        let parts: Vec<&str> = s[..version_sep].split(':').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(invalid(
                s,
                "expected group:artifact[:classifier[:type]]:version",
            ));
        }
        let classifier = parts.get(2).copied().unwrap_or("");
        let artifact_type = parts.get(3).copied().unwrap_or(TYPE_JAR);
        Self::new(parts[0], parts[1], classifier, artifact_type, version)
    }
}

impl TryFrom<String> for ArtifactCoords {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ArtifactCoords> for String {
    fn from(coords: ArtifactCoords) -> Self {
        coords.to_string()
    }
}

fn invalid(value: &str, reason: &str) -> anyhow::Error {
    CuratorError::InvalidCoords {
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn validate_segment(value: &str, name: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(invalid(value, &format!("{} must not be empty", name)));
    }
    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(invalid(
            value,
            &format!("{} is longer than {} bytes", name, MAX_SEGMENT_LENGTH),
        ));
    }
    // Segments become path components in the repository layout.
    if segment == "." || segment == ".." {
        return Err(invalid(value, &format!("{} must not be a relative path", name)));
    }
    if segment
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(invalid(
            value,
            &format!("{} contains a path separator or whitespace", name),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_segments() {
        let coords: ArtifactCoords = "io.acme:acme-core:1.0.0".parse().unwrap();
        assert_eq!(coords.group_id(), "io.acme");
        assert_eq!(coords.artifact_id(), "acme-core");
        assert_eq!(coords.classifier(), "");
        assert_eq!(coords.artifact_type(), "jar");
        assert_eq!(coords.version(), "1.0.0");
    }

    #[test]
    fn test_parse_with_classifier() {
        let coords: ArtifactCoords = "io.acme:acme-core:linux:1.0.0".parse().unwrap();
        assert_eq!(coords.classifier(), "linux");
        assert_eq!(coords.artifact_type(), "jar");
    }

    #[test]
    fn test_parse_empty_classifier_with_type() {
        let coords: ArtifactCoords = "io.playground:playground-bom::pom:1.1.1".parse().unwrap();
        assert_eq!(coords.classifier(), "");
        assert_eq!(coords.artifact_type(), "pom");
        assert_eq!(coords.version(), "1.1.1");
        assert_eq!(coords.to_string(), "io.playground:playground-bom::pom:1.1.1");
    }

    #[test]
    fn test_parse_rejects_missing_version() {
        assert!("io.acme:acme-core:".parse::<ArtifactCoords>().is_err());
        assert!("io.acme".parse::<ArtifactCoords>().is_err());
        assert!("io.acme:a:b:c:d:1.0".parse::<ArtifactCoords>().is_err());
    }

    #[test]
    fn test_parse_rejects_path_traversal() {
        let err = "io.acme:..:1.0".parse::<ArtifactCoords>().unwrap_err();
        assert!(err.to_string().contains("relative path"));
        assert!("io.acme:a/b:1.0".parse::<ArtifactCoords>().is_err());
    }

    #[test]
    fn test_key_ignores_version() {
        let a: ArtifactCoords = "io.acme:other-dep:1".parse().unwrap();
        let b: ArtifactCoords = "io.acme:other-dep:2".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "io.acme:other-dep::jar");
    }

    #[test]
    fn test_key_parse_defaults_type() {
        let key: ArtifactKey = "io.acme:acme-core".parse().unwrap();
        assert_eq!(key, ArtifactKey::ga("io.acme", "acme-core"));
        let key: ArtifactKey = "io.acme:acme-core:tests:test-jar".parse().unwrap();
        assert_eq!(key.classifier(), "tests");
        assert_eq!(key.artifact_type(), "test-jar");
    }

    #[test]
    fn test_repository_path() {
        let coords: ArtifactCoords = "io.acme.ext:acme-ext:1.2".parse().unwrap();
        assert_eq!(
            coords.repository_path(),
            PathBuf::from("io/acme/ext/acme-ext/1.2/acme-ext-1.2.jar")
        );
        let pom = coords.to_pom().unwrap();
        assert_eq!(
            pom.repository_path(),
            PathBuf::from("io/acme/ext/acme-ext/1.2/acme-ext-1.2.pom")
        );
        let classified: ArtifactCoords = "io.acme:acme:natives:jar:3".parse().unwrap();
        assert_eq!(
            classified.repository_path(),
            PathBuf::from("io/acme/acme/3/acme-3-natives.jar")
        );
    }

    #[test]
    fn test_compact_string() {
        let plain: ArtifactCoords = "io.acme:acme:1".parse().unwrap();
        assert_eq!(plain.to_compact_string(), "io.acme:acme:1");
        let bom: ArtifactCoords = "io.acme:acme-bom::pom:1".parse().unwrap();
        assert_eq!(bom.to_compact_string(), "io.acme:acme-bom::pom:1");
    }

    #[test]
    fn test_serde_as_string() {
        let coords: ArtifactCoords = "io.acme:acme:1".parse().unwrap();
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, "\"io.acme:acme::jar:1\"");
        let back: ArtifactCoords = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coords);
    }
}
