use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory and an offline local Maven repository on disk
///
/// The project depends on the `acme-rest` extension. The repository also
/// holds `acme-bundle`, an extension depending on `acme-rest`, with one
/// consistent and one broken deployment artifact.
pub struct ProjectFixture {
    pub dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(fixture.project()).unwrap();
        fs::write(
            fixture.project().join("pom.xml"),
            pom("io.acme", "app", "1.0", &[("io.acme", "acme-rest", "1.0")]),
        )
        .unwrap();

        let repo = fixture.repo();
        install_pom(&repo, "io.acme", "acme-core", "1.0", &[]);
        install_jar(&repo, "io.acme", "acme-core", "1.0", &[]);
        install_pom(&repo, "io.acme", "acme-rest", "1.0", &[("io.acme", "acme-core", "1.0")]);
        install_jar(
            &repo,
            "io.acme",
            "acme-rest",
            "1.0",
            &[(
                "META-INF/quarkus-extension.properties",
                "deployment-artifact=io.acme:acme-rest-deployment:1.0\n",
            )],
        );
        install_pom(
            &repo,
            "io.acme",
            "acme-rest-deployment",
            "1.0",
            &[("io.acme", "acme-rest", "1.0"), ("io.acme", "acme-codegen", "3.1")],
        );
        install_jar(&repo, "io.acme", "acme-rest-deployment", "1.0", &[]);
        install_pom(&repo, "io.acme", "acme-codegen", "3.1", &[]);
        install_jar(&repo, "io.acme", "acme-codegen", "3.1", &[]);

        install_pom(&repo, "io.acme", "acme-bundle", "1.0", &[("io.acme", "acme-rest", "1.0")]);
        install_jar(&repo, "io.acme", "acme-bundle", "1.0", &[]);
        install_pom(
            &repo,
            "io.acme",
            "acme-bundle-deployment",
            "1.0",
            &[
                ("io.acme", "acme-bundle", "1.0"),
                ("io.acme", "acme-rest-deployment", "1.0"),
            ],
        );
        install_jar(&repo, "io.acme", "acme-bundle-deployment", "1.0", &[]);
        install_pom(
            &repo,
            "io.acme",
            "acme-bundle-broken-deployment",
            "1.0",
            &[("io.acme", "acme-bundle", "1.0")],
        );
        install_jar(&repo, "io.acme", "acme-bundle-broken-deployment", "1.0", &[]);
        fixture
    }

    pub fn project(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    pub fn project_arg(&self) -> String {
        self.project().to_str().unwrap().to_string()
    }

    pub fn repo(&self) -> PathBuf {
        self.dir.path().join("m2")
    }

    pub fn model_file(&self) -> PathBuf {
        self.project()
            .join("target/quarkus-app/lib/deployment/appmodel.dat")
    }

    /// Writes `app-curator.config.yml` pointing at the fixture repository, offline.
    pub fn write_config(&self, extra: &str) {
        fs::write(
            self.project().join("app-curator.config.yml"),
            format!(
                "local_repository: {}\noffline: true\n{}",
                self.repo().display(),
                extra
            ),
        )
        .unwrap();
    }
}

pub fn pom(group: &str, artifact: &str, version: &str, deps: &[(&str, &str, &str)]) -> String {
    let dependencies: String = deps
        .iter()
        .map(|(g, a, v)| {
            format!(
                "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version></dependency>",
                g, a, v
            )
        })
        .collect();
    format!(
        "<project><modelVersion>4.0.0</modelVersion><groupId>{}</groupId><artifactId>{}</artifactId>\
         <version>{}</version><dependencies>{}</dependencies></project>",
        group, artifact, version, dependencies
    )
}

fn artifact_dir(repo: &Path, group: &str, artifact: &str, version: &str) -> PathBuf {
    let dir = repo
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn install_pom(repo: &Path, group: &str, artifact: &str, version: &str, deps: &[(&str, &str, &str)]) {
    let dir = artifact_dir(repo, group, artifact, version);
    fs::write(
        dir.join(format!("{}-{}.pom", artifact, version)),
        pom(group, artifact, version, deps),
    )
    .unwrap();
}

pub fn install_jar(repo: &Path, group: &str, artifact: &str, version: &str, entries: &[(&str, &str)]) {
    let dir = artifact_dir(repo, group, artifact, version);
    write_jar(&dir.join(format!("{}-{}.jar", artifact, version)), entries);
}

pub fn write_jar(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
