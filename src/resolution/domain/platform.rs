//! Platform release metadata and BOM alignment.
//!
//! A platform publishes releases, grouped by stream, each listing the BOMs that
//! make up that release. The hierarchy is platform key → stream → release. An
//! application is aligned with a platform when the BOMs it imports from that
//! platform are exactly the BOMs of one recorded release.

use crate::resolution::domain::ArtifactCoords;
use crate::shared::error::CuratorError;
use crate::shared::{Properties, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

pub const PLATFORM_RELEASE_PROPERTY_PREFIX: &str = "platform.release-info";
pub const PLATFORM_PROPERTY_PREFIX: &str = "platform.";
pub const PLATFORM_DESCRIPTOR_ARTIFACT_ID_SUFFIX: &str = "-quarkus-platform-descriptor";
pub const PLATFORM_PROPERTIES_ARTIFACT_ID_SUFFIX: &str = "-quarkus-platform-properties";

/// One platform release: the BOMs published together under a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformReleaseInfo {
    platform_key: String,
    stream: String,
    version: String,
    boms: Vec<ArtifactCoords>,
}

impl PlatformReleaseInfo {
    /// Parses a `platform.release-info@<key>$<stream>#<version>` property.
    ///
    /// # Errors
    /// Returns an error if the property name is not in that form or a BOM
    /// coordinate in the value is malformed.
    pub fn from_property(property_name: &str, property_value: &str) -> Result<Self> {
        let rest = property_name
            .strip_prefix(PLATFORM_RELEASE_PROPERTY_PREFIX)
            .and_then(|r| r.strip_prefix('@'))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "'{}' is not a platform release property (expected {}@<platform>$<stream>#<version>)",
                    property_name,
                    PLATFORM_RELEASE_PROPERTY_PREFIX
                )
            })?;

        let stream_sep = rest.rfind('$').ok_or_else(|| {
            anyhow::anyhow!("Platform release property '{}' has no stream", property_name)
        })?;
        let (platform_key, stream_and_version) = (&rest[..stream_sep], &rest[stream_sep + 1..]);
        let version_sep = stream_and_version.find('#').ok_or_else(|| {
            anyhow::anyhow!("Platform release property '{}' has no version", property_name)
        })?;
        let stream = &stream_and_version[..version_sep];
        let version = &stream_and_version[version_sep + 1..];

        if platform_key.is_empty() || stream.is_empty() || version.is_empty() {
            anyhow::bail!(
                "Platform release property '{}' has an empty platform key, stream or version",
                property_name
            );
        }

        let boms = property_value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<ArtifactCoords>)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            platform_key: platform_key.to_string(),
            stream: stream.to_string(),
            version: version.to_string(),
            boms,
        })
    }

    pub fn platform_key(&self) -> &str {
        &self.platform_key
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The release BOMs, in declaration order.
    pub fn boms(&self) -> &[ArtifactCoords] {
        &self.boms
    }

    pub fn property_name(&self) -> String {
        format!(
            "{}@{}${}#{}",
            PLATFORM_RELEASE_PROPERTY_PREFIX, self.platform_key, self.stream, self.version
        )
    }

    pub fn property_value(&self) -> String {
        self.boms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Exact match of the candidate BOMs against this release by group:artifact:version.
    pub fn is_aligned(&self, candidate: &[ArtifactCoords]) -> bool {
        gav_set(&self.boms) == gav_set(candidate)
    }
}

fn gav_set(boms: &[ArtifactCoords]) -> BTreeSet<(&str, &str, &str)> {
    boms.iter()
        .map(|b| (b.group_id(), b.artifact_id(), b.version()))
        .collect()
}

/// Releases of one platform stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStreamInfo {
    id: String,
    releases: Vec<PlatformReleaseInfo>,
}

impl PlatformStreamInfo {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            releases: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn releases(&self) -> &[PlatformReleaseInfo] {
        &self.releases
    }

    pub fn release(&self, version: &str) -> Option<&PlatformReleaseInfo> {
        self.releases.iter().find(|r| r.version == version)
    }

    fn add_release(&mut self, release: PlatformReleaseInfo) -> Result<()> {
        match self.release(&release.version) {
            Some(recorded) if recorded.boms == release.boms => Ok(()),
            Some(recorded) => Err(CuratorError::ConflictingPlatformRelease {
                platform_key: release.platform_key.clone(),
                stream: release.stream.clone(),
                version: release.version.clone(),
                recorded: recorded.property_value(),
                attempted: release.property_value(),
            }
            .into()),
            None => {
                self.releases.push(release);
                Ok(())
            }
        }
    }

    pub fn is_aligned(&self, candidate: &[ArtifactCoords]) -> bool {
        self.releases.iter().any(|r| r.is_aligned(candidate))
    }
}

/// All known streams of one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    key: String,
    streams: Vec<PlatformStreamInfo>,
}

impl PlatformInfo {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            streams: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn streams(&self) -> &[PlatformStreamInfo] {
        &self.streams
    }

    pub fn stream(&self, id: &str) -> Option<&PlatformStreamInfo> {
        self.streams.iter().find(|s| s.id == id)
    }

    fn stream_mut(&mut self, id: &str) -> &mut PlatformStreamInfo {
        let index = match self.streams.iter().position(|s| s.id == id) {
            Some(index) => index,
            None => {
                self.streams.push(PlatformStreamInfo::new(id));
                self.streams.len() - 1
            }
        };
        &mut self.streams[index]
    }

    pub fn is_aligned(&self, candidate: &[ArtifactCoords]) -> bool {
        self.streams.iter().any(|s| s.is_aligned(candidate))
    }
}

/// Platform metadata collected from the application's managed dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformImports {
    #[serde(default)]
    platforms: BTreeMap<String, PlatformInfo>,
    /// BOMs imported by the application, by platform key
    #[serde(default)]
    imported_boms: BTreeMap<String, Vec<ArtifactCoords>>,
    /// `platform.*` properties other than release info
    #[serde(default)]
    platform_properties: BTreeMap<String, String>,
}

impl PlatformImports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a release from its property form, creating the platform and
    /// stream on demand.
    ///
    /// # Errors
    /// - The property is malformed
    /// - The same platform, stream and version was already recorded with other BOMs
    pub fn add_platform_release(&mut self, property_name: &str, property_value: &str) -> Result<()> {
        let release = PlatformReleaseInfo::from_property(property_name, property_value)?;
        debug!(
            platform = release.platform_key(),
            stream = release.stream(),
            version = release.version(),
            "recording platform release"
        );
        let platform_key = release.platform_key.clone();
        let stream = release.stream.clone();
        self.platforms
            .entry(platform_key.clone())
            .or_insert_with(|| PlatformInfo::new(&platform_key))
            .stream_mut(&stream)
            .add_release(release)
    }

    /// Records a `*-quarkus-platform-descriptor` artifact as an imported platform BOM.
    pub fn add_platform_descriptor(&mut self, descriptor: &ArtifactCoords) -> Result<()> {
        let Some(bom_artifact) = descriptor
            .artifact_id()
            .strip_suffix(PLATFORM_DESCRIPTOR_ARTIFACT_ID_SUFFIX)
        else {
            anyhow::bail!("{} is not a platform descriptor artifact", descriptor);
        };
        let bom = ArtifactCoords::pom(descriptor.group_id(), bom_artifact, descriptor.version())?;
        let boms = self
            .imported_boms
            .entry(descriptor.group_id().to_string())
            .or_default();
        if !boms.contains(&bom) {
            boms.push(bom);
        }
        Ok(())
    }

    /// Scans a platform properties artifact: release info goes into the
    /// release hierarchy, other `platform.*` properties are kept as is.
    pub fn add_platform_properties(&mut self, source: &ArtifactCoords, props: &Properties) -> Result<()> {
        for (name, value) in props.iter() {
            if name.starts_with(PLATFORM_RELEASE_PROPERTY_PREFIX) {
                self.add_platform_release(name, value)?;
            } else if name.starts_with(PLATFORM_PROPERTY_PREFIX) {
                match self.platform_properties.get(name) {
                    Some(existing) if existing != value => {
                        warn!(
                            property = name,
                            kept = existing.as_str(),
                            ignored = value,
                            source = %source,
                            "conflicting platform property value"
                        );
                    }
                    Some(_) => {}
                    None => {
                        self.platform_properties
                            .insert(name.to_string(), value.to_string());
                    }
                }
            }
        }
        Ok(())
    }

    pub fn platforms(&self) -> impl Iterator<Item = &PlatformInfo> {
        self.platforms.values()
    }

    pub fn platform(&self, key: &str) -> Option<&PlatformInfo> {
        self.platforms.get(key)
    }

    pub fn imported_boms_by_platform(&self) -> &BTreeMap<String, Vec<ArtifactCoords>> {
        &self.imported_boms
    }

    pub fn platform_properties(&self) -> &BTreeMap<String, String> {
        &self.platform_properties
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty() && self.imported_boms.is_empty()
    }

    /// True when, for every platform key in `candidate` that has recorded
    /// releases, the candidate BOMs exactly match one of those releases.
    pub fn is_aligned(&self, candidate: &BTreeMap<String, Vec<ArtifactCoords>>) -> bool {
        candidate.iter().all(|(key, boms)| match self.platforms.get(key) {
            Some(platform) => platform.is_aligned(boms),
            None => true,
        })
    }

    /// Alignment of the BOMs the application imports.
    pub fn is_imported_aligned(&self) -> bool {
        self.is_aligned(&self.imported_boms)
    }

    /// Describes each misaligned platform, or `None` when aligned.
    pub fn misalignment_report(&self) -> Option<String> {
        let mut lines = Vec::new();
        for (key, boms) in &self.imported_boms {
            let Some(platform) = self.platforms.get(key) else {
                continue;
            };
            if platform.is_aligned(boms) {
                continue;
            }
            lines.push(format!("Platform {} imports:", key));
            for bom in boms {
                lines.push(format!("  {}", bom));
            }
            lines.push("which does not match any recorded release:".to_string());
            for stream in platform.streams() {
                for release in stream.releases() {
                    lines.push(format!(
                        "  {}#{}: {}",
                        stream.id(),
                        release.version(),
                        release.property_value()
                    ));
                }
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
