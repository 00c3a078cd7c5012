use super::*;
use crate::resolution::domain::{ArtifactDescriptor, ResolutionMode};
use crate::shared::error::ModelLoadError;
use crate::shared::Properties;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

// Mock implementations for testing
#[derive(Default)]
struct MockRepository {
    project: Option<ProjectDescriptor>,
    descriptors: HashMap<ArtifactCoords, ArtifactDescriptor>,
    workspace: HashSet<ArtifactKey>,
    descriptor_reads: Cell<usize>,
}

impl MockRepository {
    fn artifact(&mut self, coords: &str, deps: &[(&str, Scope)]) -> &mut Self {
        let dependencies = deps
            .iter()
            .map(|(c, s)| Dependency::new(c.parse().unwrap(), *s))
            .collect();
        self.descriptors.insert(
            coords.parse().unwrap(),
            ArtifactDescriptor::new(dependencies, Vec::new()),
        );
        self
    }

    fn project(&mut self, deps: Vec<Dependency>, managed: Vec<Dependency>) -> &mut Self {
        self.project = Some(ProjectDescriptor {
            coords: "io.acme:app:1.0".parse().unwrap(),
            dependencies: deps,
            managed_dependencies: managed,
            path: PathBuf::from("/project/pom.xml"),
            content: "<project/>".to_string(),
        });
        self
    }
}

fn artifact_path(coords: &ArtifactCoords) -> PathBuf {
    PathBuf::from("/repo").join(coords.repository_path())
}

impl ArtifactResolver for MockRepository {
    fn resolve(&self, coords: &ArtifactCoords) -> Result<ResolvedArtifact> {
        Ok(ResolvedArtifact {
            coords: coords.clone(),
            path: artifact_path(coords),
            workspace_module: self.workspace.contains(coords.key()),
        })
    }

    fn read_descriptor(&self, coords: &ArtifactCoords) -> Result<ArtifactDescriptor> {
        self.descriptor_reads.set(self.descriptor_reads.get() + 1);
        self.descriptors.get(coords).cloned().ok_or_else(|| {
            CuratorError::ArtifactNotFound {
                coords: coords.to_string(),
                searched: "mock".to_string(),
            }
            .into()
        })
    }

    fn install(&self, _coords: &ArtifactCoords, file: &Path) -> Result<PathBuf> {
        Ok(file.to_path_buf())
    }
}

impl ProjectDescriptorReader for MockRepository {
    fn read_project(&self, _project_path: &Path) -> Result<ProjectDescriptor> {
        self.project
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no project configured"))
    }
}

#[derive(Default)]
struct MockDescriptorReader {
    extensions: HashMap<PathBuf, Properties>,
    properties_files: HashMap<PathBuf, Properties>,
}

impl MockDescriptorReader {
    fn extension(&mut self, coords: &str, props: &[(&str, &str)]) -> &mut Self {
        let coords: ArtifactCoords = coords.parse().unwrap();
        self.extensions.insert(
            artifact_path(&coords),
            props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        );
        self
    }
}

impl ExtensionDescriptorReader for MockDescriptorReader {
    fn read_extension_properties(&self, artifact_path: &Path) -> Result<Option<Properties>> {
        Ok(self.extensions.get(artifact_path).cloned())
    }

    fn read_properties_file(&self, path: &Path) -> Result<Properties> {
        self.properties_files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no properties at {}", path.display()))
    }
}

#[derive(Default)]
struct MockModelStore {
    model: RefCell<Option<ApplicationModel>>,
}

impl ModelStore for &MockModelStore {
    fn persist(&self, model: &ApplicationModel, output_dir: &Path) -> Result<PathBuf> {
        *self.model.borrow_mut() = Some(model.clone());
        Ok(output_dir.join("appmodel.dat"))
    }

    fn load(&self, output_dir: &Path) -> std::result::Result<ApplicationModel, ModelLoadError> {
        self.model
            .borrow()
            .clone()
            .ok_or_else(|| ModelLoadError::Missing {
                path: output_dir.to_path_buf(),
            })
    }
}

#[derive(Default)]
struct MockProgressReporter {
    errors: RefCell<Vec<String>>,
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, _message: &str) {}

    fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}

    fn report_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn report_completion(&self, _message: &str) {}
}

fn dep(coords: &str) -> Dependency {
    Dependency::new(coords.parse().unwrap(), Scope::Compile)
}

fn key(s: &str) -> ArtifactKey {
    s.parse().unwrap()
}

fn request(mode: ResolutionMode) -> CurationRequest {
    CurationRequest::new(
        PathBuf::from("/project"),
        mode,
        PathBuf::from("/project/target/quarkus-app"),
    )
}

/// An application depending on one extension, acme-rest, whose deployment
/// artifact brings a build-only library.
fn rest_app() -> (MockRepository, MockDescriptorReader) {
    let mut repo = MockRepository::default();
    repo.project(vec![dep("io.acme:acme-rest:1.0"), dep("io.acme:util:1.0")], Vec::new())
        .artifact("io.acme:acme-rest:1.0", &[("io.acme:acme-core:1.0", Scope::Compile)])
        .artifact("io.acme:acme-core:1.0", &[])
        .artifact("io.acme:util:1.0", &[])
        .artifact(
            "io.acme:acme-rest-deployment:1.0",
            &[
                ("io.acme:acme-rest:1.0", Scope::Compile),
                ("io.acme:acme-build-lib:2.0", Scope::Compile),
            ],
        )
        .artifact("io.acme:acme-build-lib:2.0", &[]);

    let mut reader = MockDescriptorReader::default();
    reader.extension(
        "io.acme:acme-rest:1.0",
        &[
            ("deployment-artifact", "io.acme:acme-rest-deployment:1.0"),
            ("parent-first-artifacts", "io.acme:acme-core"),
        ],
    );
    (repo, reader)
}

fn curate(
    repo: MockRepository,
    reader: MockDescriptorReader,
    store: &MockModelStore,
    request: CurationRequest,
) -> Result<CurationResponse> {
    CurateAppModelUseCase::new(repo, reader, store, MockProgressReporter::default()).execute(request)
}

#[test]
fn test_runtime_and_deployment_classification() {
    let (repo, reader) = rest_app();
    let store = MockModelStore::default();
    let response = curate(repo, reader, &store, request(ResolutionMode::Prod)).unwrap();
    let model = &response.model;

    let rest = model.dependency(&key("io.acme:acme-rest")).unwrap();
    assert!(rest.is_flag_set(
        DependencyFlags::RUNTIME_CP
            | DependencyFlags::DEPLOYMENT_CP
            | DependencyFlags::DIRECT
            | DependencyFlags::RUNTIME_EXTENSION_ARTIFACT
            | DependencyFlags::TOP_LEVEL_RUNTIME_EXTENSION_ARTIFACT
    ));
    assert_eq!(rest.dependencies().len(), 1);

    let core = model.dependency(&key("io.acme:acme-core")).unwrap();
    assert!(core.is_runtime_cp());
    assert!(!core.is_flag_set(DependencyFlags::DIRECT));
    assert!(core.is_flag_set(DependencyFlags::CLASSLOADER_PARENT_FIRST));

    for deployment_only in ["io.acme:acme-rest-deployment", "io.acme:acme-build-lib"] {
        let d = model.dependency(&key(deployment_only)).unwrap();
        assert!(d.is_deployment_cp(), "{}", deployment_only);
        assert!(!d.is_runtime_cp(), "{}", deployment_only);
        assert!(!d.is_flag_set(DependencyFlags::DIRECT), "{}", deployment_only);
    }

    assert_eq!(model.runtime_dependencies().count(), 3);
    assert_eq!(model.deployment_only_dependencies().count(), 2);
    assert!(!response.reused);
    assert!(store.model.borrow().is_some());
}

#[test]
fn test_excluded_deployment_artifact_is_missing_in_deployment_module() {
    let (repo, reader) = rest_app();
    let store = MockModelStore::default();
    let request = request(ResolutionMode::Prod)
        .with_excluded_artifacts(vec!["io.acme:acme-rest-deployment".parse().unwrap()]);

    let err = curate(repo, reader, &store, request).unwrap_err();
    match err.downcast_ref::<CuratorError>() {
        Some(CuratorError::Validation { issues }) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].artifact, "io.acme:acme-rest::jar");
            assert_eq!(issues[0].message, crate::resolution::services::MISSING_IN_DEPLOYMENT_MODULE);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(store.model.borrow().is_none());
}

#[test]
fn test_deployment_artifact_on_runtime_classpath_fails() {
    let (mut repo, reader) = rest_app();
    repo.project(
        vec![
            dep("io.acme:acme-rest:1.0"),
            dep("io.acme:acme-rest-deployment:1.0"),
        ],
        Vec::new(),
    );
    let store = MockModelStore::default();
    let err = curate(repo, reader, &store, request(ResolutionMode::Prod)).unwrap_err();
    assert!(err.to_string().contains("found on the runtime classpath"));
}

#[test]
fn test_deployment_not_depending_on_runtime_is_reported() {
    let (mut repo, reader) = rest_app();
    repo.artifact(
        "io.acme:acme-rest-deployment:1.0",
        &[("io.acme:acme-build-lib:2.0", Scope::Compile)],
    );
    let store = MockModelStore::default();
    let err = curate(repo, reader, &store, request(ResolutionMode::Prod)).unwrap_err();
    assert!(err
        .to_string()
        .contains("does not appear to depend on the corresponding runtime artifact io.acme:acme-rest::jar:1.0"));
}

#[test]
fn test_conditional_dependencies_activate_in_chain() {
    let (mut repo, mut reader) = rest_app();
    repo.artifact("io.acme:acme-rest-json:1.0", &[])
        .artifact("io.acme:acme-rest-json-deployment:1.0", &[("io.acme:acme-rest-json:1.0", Scope::Compile)])
        .artifact("io.acme:acme-json-extra:1.0", &[])
        .artifact("io.acme:acme-metrics:1.0", &[]);
    reader
        .extension(
            "io.acme:acme-rest:1.0",
            &[
                ("deployment-artifact", "io.acme:acme-rest-deployment:1.0"),
                (
                    "conditional-dependencies",
                    "io.acme:acme-rest-json:1.0 io.acme:acme-metrics:1.0",
                ),
            ],
        )
        .extension(
            "io.acme:acme-rest-json:1.0",
            &[
                ("deployment-artifact", "io.acme:acme-rest-json-deployment:1.0"),
                ("dependency-condition", "io.acme:util"),
                ("conditional-dependencies", "io.acme:acme-json-extra:1.0"),
            ],
        )
        .extension(
            "io.acme:acme-metrics:1.0",
            &[
                ("deployment-artifact", "io.acme:acme-metrics-deployment:1.0"),
                ("dependency-condition", "io.acme:not-present"),
            ],
        );

    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Prod))
        .unwrap()
        .model;

    let json = model.dependency(&key("io.acme:acme-rest-json")).unwrap();
    assert!(json.is_runtime_cp());
    assert!(json.is_runtime_extension());
    assert!(!json.is_flag_set(DependencyFlags::TOP_LEVEL_RUNTIME_EXTENSION_ARTIFACT));
    assert!(model.dependency(&key("io.acme:acme-json-extra")).is_some());
    assert!(model.dependency(&key("io.acme:acme-metrics")).is_none());
    assert!(model
        .dependency(&key("io.acme:acme-rest-json-deployment"))
        .unwrap()
        .is_deployment_cp());
}

#[test]
fn test_provided_dependencies_are_compile_only() {
    let (mut repo, reader) = rest_app();
    repo.project(
        vec![
            dep("io.acme:acme-rest:1.0"),
            Dependency::new("io.acme:servlet-api:4.0".parse().unwrap(), Scope::Provided),
            Dependency::new("io.acme:acme-core:1.0".parse().unwrap(), Scope::Provided),
        ],
        Vec::new(),
    )
    .artifact("io.acme:servlet-api:4.0", &[]);

    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Prod))
        .unwrap()
        .model;

    let api = model.dependency(&key("io.acme:servlet-api")).unwrap();
    assert!(api.is_flag_set(DependencyFlags::COMPILE_ONLY | DependencyFlags::DIRECT));
    assert!(!api.is_runtime_cp());
    assert!(!api.is_deployment_cp());
    assert_eq!(model.compile_only_dependencies().count(), 2);
    assert!(model
        .dependency(&key("io.acme:acme-core"))
        .unwrap()
        .is_runtime_cp());
}

#[test]
fn test_dev_mode_marks_reloadable_workspace_modules() {
    let (mut repo, reader) = rest_app();
    repo.project(
        vec![dep("io.acme:acme-rest:1.0"), dep("io.acme:module-a:1.0")],
        Vec::new(),
    )
    .artifact("io.acme:module-a:1.0", &[("io.acme:module-b:1.0", Scope::Compile)])
    .artifact("io.acme:module-b:1.0", &[]);
    repo.workspace.insert(key("io.acme:module-a"));
    repo.workspace.insert(key("io.acme:module-b"));

    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Dev))
        .unwrap()
        .model;

    assert!(model.reloadable_workspace_modules().contains(&key("io.acme:module-a")));
    assert!(model.reloadable_workspace_modules().contains(&key("io.acme:module-b")));
    assert!(!model
        .dependency(&key("io.acme:acme-rest"))
        .unwrap()
        .is_reloadable());
}

#[test]
fn test_prod_mode_keeps_workspace_flag_without_reloading() {
    let (mut repo, reader) = rest_app();
    repo.workspace.insert(key("io.acme:util"));
    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Prod))
        .unwrap()
        .model;
    let util = model.dependency(&key("io.acme:util")).unwrap();
    assert!(util.is_flag_set(DependencyFlags::WORKSPACE_MODULE));
    assert!(!util.is_reloadable());
    assert!(model.reloadable_workspace_modules().is_empty());
}

fn platform_app(bom_version: &str) -> (MockRepository, MockDescriptorReader) {
    let (mut repo, mut reader) = rest_app();
    let descriptor = format!(
        "io.playground:acme-bom-quarkus-platform-descriptor:{}:json:{}",
        bom_version, bom_version
    );
    let properties: ArtifactCoords = "io.playground:acme-bom-quarkus-platform-properties::properties:2.2.2"
        .parse()
        .unwrap();
    repo.project(
        vec![dep("io.acme:acme-rest:1.0")],
        vec![
            dep(&descriptor),
            Dependency::new(properties.clone(), Scope::Compile),
        ],
    );
    reader.properties_files.insert(
        artifact_path(&properties),
        [
            (
                "platform.release-info@io.playground$1.1#1.1.1",
                "io.playground:acme-bom::pom:2.2.2",
            ),
            ("platform.quarkus.native.builder-image", "mandrel"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    );
    (repo, reader)
}

#[test]
fn test_aligned_platform_records_properties() {
    let (repo, reader) = platform_app("2.2.2");
    let store = MockModelStore::default();
    let response = curate(repo, reader, &store, request(ResolutionMode::Prod)).unwrap();
    assert!(response.is_aligned());
    let props = response.model.build_system_properties();
    assert_eq!(props.get("platform.quarkus.native.builder-image"), Some("mandrel"));
    assert_eq!(props.get("quarkus.app-model.mode"), Some("prod"));
}

#[test]
fn test_misaligned_platform_warns_or_fails_when_strict() {
    let (repo, reader) = platform_app("2.2.3");
    let store = MockModelStore::default();
    let response = curate(repo, reader, &store, request(ResolutionMode::Prod)).unwrap();
    assert!(response
        .misalignment_report
        .as_deref()
        .unwrap()
        .contains("io.playground:acme-bom::pom:2.2.3"));

    let (repo, reader) = platform_app("2.2.3");
    let strict = request(ResolutionMode::Prod).with_strict_alignment(true);
    let err = curate(repo, reader, &MockModelStore::default(), strict).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CuratorError>(),
        Some(CuratorError::PlatformMisaligned { .. })
    ));
}

#[test]
fn test_reuse_skips_resolution_when_fingerprint_matches() {
    let store = MockModelStore::default();
    let (repo, reader) = rest_app();
    let first = curate(repo, reader, &store, request(ResolutionMode::Dev)).unwrap();

    let (repo, reader) = rest_app();
    let use_case =
        CurateAppModelUseCase::new(repo, reader, &store, MockProgressReporter::default());
    let second = use_case
        .execute(request(ResolutionMode::Dev).with_reuse(true))
        .unwrap();
    assert!(second.reused);
    assert_eq!(second.model.fingerprint(), first.model.fingerprint());
    assert_eq!(use_case.repository.descriptor_reads.get(), 0);

    let (repo, reader) = rest_app();
    let use_case =
        CurateAppModelUseCase::new(repo, reader, &store, MockProgressReporter::default());
    let prod = use_case
        .execute(request(ResolutionMode::Prod).with_reuse(true))
        .unwrap();
    assert!(!prod.reused);
    assert!(use_case.repository.descriptor_reads.get() > 0);
}

#[test]
fn test_missing_artifact_aborts_resolution() {
    let (mut repo, reader) = rest_app();
    repo.descriptors.remove(&"io.acme:acme-core:1.0".parse().unwrap());
    let store = MockModelStore::default();
    let err = curate(repo, reader, &store, request(ResolutionMode::Prod)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CuratorError>(),
        Some(CuratorError::ArtifactNotFound { .. })
    ));
}

#[test]
fn test_deployment_dependencies_follow_runtime_versions() {
    let (mut repo, reader) = rest_app();
    repo.artifact("io.acme:util:1.0", &[("io.acme:mid:1.0", Scope::Compile)])
        .artifact("io.acme:mid:1.0", &[("io.acme:shared:1.0", Scope::Compile)])
        .artifact("io.acme:shared:1.0", &[])
        .artifact("io.acme:shared:2.0", &[("io.acme:only-in-shared-2:1.0", Scope::Compile)])
        .artifact("io.acme:only-in-shared-2:1.0", &[])
        .artifact(
            "io.acme:acme-rest-deployment:1.0",
            &[
                ("io.acme:acme-rest:1.0", Scope::Compile),
                ("io.acme:shared:2.0", Scope::Compile),
            ],
        );

    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Prod))
        .unwrap()
        .model;

    let shared = model.dependency(&key("io.acme:shared")).unwrap();
    assert_eq!(shared.coords().version(), "1.0");
    assert!(shared.is_runtime_cp());
    assert!(model.dependency(&key("io.acme:only-in-shared-2")).is_none());
}

#[test]
fn test_deployment_keeps_dependencies_of_artifact_also_declared_optional() {
    let (mut repo, reader) = rest_app();
    repo.artifact(
        "io.acme:acme-rest-deployment:1.0",
        &[("io.acme:acme-rest:1.0", Scope::Compile), ("io.acme:lib:1.0", Scope::Compile)],
    )
    .artifact("io.acme:lib:1.0", &[("io.acme:opt:1.0", Scope::Compile)])
    .artifact("io.acme:opt:1.0", &[("io.acme:x:1.0", Scope::Compile)])
    .artifact("io.acme:x:1.0", &[]);
    // opt is also an optional direct dependency of the deployment artifact
    let deployment: ArtifactCoords = "io.acme:acme-rest-deployment:1.0".parse().unwrap();
    let descriptor = repo.descriptors.get_mut(&deployment).unwrap();
    descriptor
        .dependencies
        .insert(1, dep("io.acme:opt:1.0").optional(true));

    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Prod))
        .unwrap()
        .model;

    for build_only in ["io.acme:lib", "io.acme:opt", "io.acme:x"] {
        let d = model.dependency(&key(build_only)).unwrap();
        assert!(d.is_deployment_cp(), "{}", build_only);
        assert!(!d.is_runtime_cp(), "{}", build_only);
    }
}

#[test]
fn test_conditional_dependency_uses_managed_versions() {
    let (mut repo, mut reader) = rest_app();
    repo.project(
        vec![dep("io.acme:acme-rest:1.0"), dep("io.acme:util:1.0")],
        vec![dep("io.acme:json-lib:1.5")],
    )
    .artifact("io.acme:acme-rest-json:1.0", &[("io.acme:json-lib:1.0", Scope::Compile)])
    .artifact("io.acme:json-lib:1.0", &[])
    .artifact("io.acme:json-lib:1.5", &[]);
    reader.extension(
        "io.acme:acme-rest:1.0",
        &[
            ("deployment-artifact", "io.acme:acme-rest-deployment:1.0"),
            ("conditional-dependencies", "io.acme:acme-rest-json:1.0"),
        ],
    );

    let store = MockModelStore::default();
    let model = curate(repo, reader, &store, request(ResolutionMode::Prod))
        .unwrap()
        .model;

    assert!(model.dependency(&key("io.acme:acme-rest-json")).unwrap().is_runtime_cp());
    let json_lib = model.dependency(&key("io.acme:json-lib")).unwrap();
    assert_eq!(json_lib.coords().version(), "1.5");
    assert!(json_lib.is_runtime_cp());
}
