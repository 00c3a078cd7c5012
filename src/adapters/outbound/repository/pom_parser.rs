//! pom.xml parsing.
//!
//! Uses the quick-xml SAX reader. Elements are tracked as a path of local
//! names from `<project>`, and text is dispatched when an element closes.
//! Profiles, build sections and reporting are not read.

use crate::shared::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

/// `<parent>` of a POM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

/// A `<dependency>` entry before inheritance and interpolation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub dependency_type: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    /// `(groupId, artifactId)` pairs
    pub exclusions: Vec<(String, String)>,
}

/// A POM as written, before inheritance and interpolation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<RawParent>,
    /// In declaration order
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<RawDependency>,
    pub managed_dependencies: Vec<RawDependency>,
    pub modules: Vec<String>,
}

impl RawPom {
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.version.as_str()))
    }
}

#[derive(Default)]
struct ExclusionAccum {
    group_id: String,
    artifact_id: String,
}

/// Parses pom.xml content.
///
/// # Errors
/// Returns an error if the XML is malformed or the root element is not `<project>`.
pub fn parse_pom(content: &str) -> Result<RawPom> {
    // Entity references arrive as separate events; text is trimmed per element instead.
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut pom = RawPom::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut parent: Option<RawParent> = None;
    let mut dependency: Option<RawDependency> = None;
    let mut exclusion: Option<ExclusionAccum> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| anyhow::anyhow!("Malformed POM at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if path.is_empty() && name != "project" {
                    anyhow::bail!("Not a POM: root element is <{}>", name);
                }
                path.push(name);
                text.clear();
                on_open(&path, &mut parent, &mut dependency, &mut exclusion);
            }
            Event::Empty(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                path.push(name);
                text.clear();
                on_open(&path, &mut parent, &mut dependency, &mut exclusion);
                on_close(&path, "", &mut pom, &mut parent, &mut dependency, &mut exclusion);
                path.pop();
            }
            Event::Text(ref e) => {
                let decoded = match e.decode() {
                    Ok(cow) => {
                        let s = cow.into_owned();
                        quick_xml::escape::unescape(&s)
                            .map(|c| c.into_owned())
                            .unwrap_or(s)
                    }
                    Err(_) => String::from_utf8_lossy(e.as_ref()).to_string(),
                };
                text.push_str(&decoded);
            }
            Event::CData(ref e) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(ref e) => {
                if let Ok(Some(c)) = e.resolve_char_ref() {
                    text.push(c);
                } else {
                    let name = String::from_utf8_lossy(e.as_ref()).to_string();
                    match name.as_str() {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        other => {
                            text.push('&');
                            text.push_str(other);
                            text.push(';');
                        }
                    }
                }
            }
            Event::End(_) => {
                let value = text.trim().to_string();
                text.clear();
                on_close(&path, &value, &mut pom, &mut parent, &mut dependency, &mut exclusion);
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        anyhow::bail!("Malformed POM: <{}> is not closed", path.join("/"));
    }
    if pom.artifact_id.is_none() && pom.parent.is_none() && pom.group_id.is_none() {
        anyhow::bail!("Not a POM: no <project> coordinates found");
    }
    Ok(pom)
}

fn segments(path: &[String]) -> Vec<&str> {
    path.iter().map(String::as_str).collect()
}

fn on_open(
    path: &[String],
    parent: &mut Option<RawParent>,
    dependency: &mut Option<RawDependency>,
    exclusion: &mut Option<ExclusionAccum>,
) {
    match segments(path).as_slice() {
        ["project", "parent"] => *parent = Some(RawParent::default()),
        ["project", "dependencies", "dependency"]
        | ["project", "dependencyManagement", "dependencies", "dependency"] => {
            *dependency = Some(RawDependency::default());
        }
        ["project", "dependencies", "dependency", "exclusions", "exclusion"]
        | ["project", "dependencyManagement", "dependencies", "dependency", "exclusions", "exclusion"] => {
            *exclusion = Some(ExclusionAccum::default());
        }
        _ => {}
    }
}

fn on_close(
    path: &[String],
    value: &str,
    pom: &mut RawPom,
    parent: &mut Option<RawParent>,
    dependency: &mut Option<RawDependency>,
    exclusion: &mut Option<ExclusionAccum>,
) {
    let value_owned = || value.to_string();
    match segments(path).as_slice() {
        ["project", "groupId"] => pom.group_id = Some(value_owned()),
        ["project", "artifactId"] => pom.artifact_id = Some(value_owned()),
        ["project", "version"] => pom.version = Some(value_owned()),
        ["project", "packaging"] => pom.packaging = Some(value_owned()),
        ["project", "modules", "module"] => pom.modules.push(value_owned()),
        ["project", "properties", key] => pom.properties.push((key.to_string(), value_owned())),

        ["project", "parent", field] => {
            if let Some(p) = parent.as_mut() {
                match *field {
                    "groupId" => p.group_id = value_owned(),
                    "artifactId" => p.artifact_id = value_owned(),
                    "version" => p.version = value_owned(),
                    "relativePath" => p.relative_path = Some(value_owned()),
                    _ => {}
                }
            }
        }
        ["project", "parent"] => pom.parent = parent.take(),

        [.., "dependency", "exclusions", "exclusion", field] => {
            if let Some(x) = exclusion.as_mut() {
                match *field {
                    "groupId" => x.group_id = value_owned(),
                    "artifactId" => x.artifact_id = value_owned(),
                    _ => {}
                }
            }
        }
        [.., "dependency", "exclusions", "exclusion"] => {
            if let (Some(x), Some(d)) = (exclusion.take(), dependency.as_mut()) {
                d.exclusions.push((x.group_id, x.artifact_id));
            }
        }

        ["project", "dependencies", "dependency", field]
        | ["project", "dependencyManagement", "dependencies", "dependency", field] => {
            if let Some(d) = dependency.as_mut() {
                match *field {
                    "groupId" => d.group_id = value_owned(),
                    "artifactId" => d.artifact_id = value_owned(),
                    "version" => d.version = Some(value_owned()),
                    "classifier" => d.classifier = Some(value_owned()),
                    "type" => d.dependency_type = Some(value_owned()),
                    "scope" => d.scope = Some(value_owned()),
                    "optional" => d.optional = Some(value_owned()),
                    _ => {}
                }
            }
        }
        ["project", "dependencies", "dependency"] => {
            if let Some(d) = dependency.take() {
                pom.dependencies.push(d);
            }
        }
        ["project", "dependencyManagement", "dependencies", "dependency"] => {
            if let Some(d) = dependency.take() {
                pom.managed_dependencies.push(d);
            }
        }
        _ => {}
    }
}
