/// End-to-end tests for the CLI
///
/// Every run is offline against a local repository built in a temporary
/// directory, so no test reaches the network.
mod test_utilities;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use test_utilities::fixtures::ProjectFixture;

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("app-curator").arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("app-curator").arg("--version").assert().code(0);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("app-curator")
            .args(["resolve", "--invalid-option"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Missing subcommand
    #[test]
    fn test_exit_code_missing_subcommand() {
        cargo_bin_cmd!("app-curator").assert().code(2);
    }

    /// Exit code 2: Invalid mode value
    #[test]
    fn test_exit_code_invalid_mode() {
        cargo_bin_cmd!("app-curator")
            .args(["resolve", "--mode", "staging"])
            .assert()
            .code(2);
    }

    /// Exit code 3: Application error - non-existent project path
    #[test]
    fn test_exit_code_application_error_nonexistent_path() {
        cargo_bin_cmd!("app-curator")
            .args(["resolve", "-p", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Directory does not exist"));
    }

    /// Exit code 3: Application error - path is a file, not a directory
    #[test]
    fn test_exit_code_application_error_file_not_directory() {
        cargo_bin_cmd!("app-curator")
            .args(["resolve", "-p", "Cargo.toml"])
            .assert()
            .code(3);
    }

    /// Exit code 1: a runtime extension without its deployment artifact
    #[test]
    fn test_exit_code_validation_failure() {
        let fixture = ProjectFixture::new();
        fixture.write_config("");
        cargo_bin_cmd!("app-curator")
            .args([
                "resolve",
                "-p",
                &fixture.project_arg(),
                "-e",
                "io.acme:acme-rest-deployment",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "io.acme:acme-rest::jar is missing in the deployment module",
            ));
        assert!(!fixture.model_file().exists());
    }
}

#[test]
fn test_resolve_persists_model() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");

    cargo_bin_cmd!("app-curator")
        .args(["resolve", "-p", &fixture.project_arg()])
        .assert()
        .success()
        .stderr(predicate::str::contains("📦 io.acme:app:1.0 (prod mode)"))
        .stderr(predicate::str::contains("Runtime classpath:  2"))
        .stderr(predicate::str::contains("Deployment only:    2"));

    assert!(fixture.model_file().is_file());
    let props = fs::read_to_string(
        fixture
            .project()
            .join("target/quarkus-app/lib/deployment/build-system.properties"),
    )
    .unwrap();
    assert!(props.contains("quarkus.app-model.mode=prod"));
}

#[test]
fn test_resolve_reuses_unchanged_model() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");
    let project = fixture.project_arg();

    cargo_bin_cmd!("app-curator")
        .args(["resolve", "-p", &project])
        .assert()
        .success();
    cargo_bin_cmd!("app-curator")
        .args(["resolve", "-p", &project, "--reuse"])
        .assert()
        .success()
        .stderr(predicate::str::contains("(prod mode, reused)"));
}

#[test]
fn test_resolve_fails_for_missing_artifact_offline() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");
    fs::remove_dir_all(fixture.repo().join("io/acme/acme-core")).unwrap();

    cargo_bin_cmd!("app-curator")
        .args(["resolve", "-p", &fixture.project_arg()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Artifact not found"))
        .stderr(predicate::str::contains("(offline)"));
}

#[test]
fn test_show_json_after_resolve() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");
    let project = fixture.project_arg();

    cargo_bin_cmd!("app-curator")
        .args(["resolve", "-p", &project])
        .assert()
        .success();

    let output = cargo_bin_cmd!("app-curator")
        .args(["show", "-p", &project, "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["application"], "io.acme:app::jar:1.0");
    assert_eq!(json["mode"], "prod");
    let rest = json["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["coords"] == "io.acme:acme-rest::jar:1.0")
        .unwrap();
    let flags: Vec<&str> = rest["flags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert!(flags.contains(&"runtime-extension"));
    assert!(flags.contains(&"top-level-extension"));
}

#[test]
fn test_show_text_to_file() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");
    let project = fixture.project_arg();
    cargo_bin_cmd!("app-curator")
        .args(["resolve", "-p", &project])
        .assert()
        .success();

    let out = fixture.dir.path().join("model.txt");
    cargo_bin_cmd!("app-curator")
        .args(["show", "-p", &project, "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let text = fs::read_to_string(out).unwrap();
    assert!(text.starts_with("Application io.acme:app:1.0 (prod mode)"));
    assert!(text.contains("Runtime classpath (2)"));
    assert!(text.contains("io.acme:acme-codegen:3.1"));
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn test_show_without_model() {
    let fixture = ProjectFixture::new();
    cargo_bin_cmd!("app-curator")
        .args(["show", "-p", &fixture.project_arg()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No persisted application model"));
}

#[test]
fn test_install_into_local_repository() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");
    let jar = fixture.dir.path().join("extra.jar");
    test_utilities::fixtures::write_jar(&jar, &[]);

    cargo_bin_cmd!("app-curator")
        .args([
            "install",
            "-p",
            &fixture.project_arg(),
            "--coords",
            "io.acme:extra:2.0",
            "--file",
            jar.to_str().unwrap(),
        ])
        .assert()
        .success();

    let installed = fixture.repo().join("io/acme/extra/2.0");
    assert!(installed.join("extra-2.0.jar").is_file());
    assert!(installed.join("extra-2.0.pom").is_file());
}

#[test]
fn test_install_rejects_invalid_coords() {
    let fixture = ProjectFixture::new();
    cargo_bin_cmd!("app-curator")
        .args([
            "install",
            "-p",
            &fixture.project_arg(),
            "--coords",
            "io.acme",
            "--file",
            "Cargo.toml",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("io.acme"));
}

#[test]
fn test_validate_extension_module() {
    let fixture = ProjectFixture::new();
    fixture.write_config("");
    let project = fixture.project_arg();

    cargo_bin_cmd!("app-curator")
        .args([
            "validate",
            "-p",
            &project,
            "--runtime",
            "io.acme:acme-bundle:1.0",
            "--deployment",
            "io.acme:acme-bundle-deployment:1.0",
        ])
        .assert()
        .success();

    cargo_bin_cmd!("app-curator")
        .args([
            "validate",
            "-p",
            &project,
            "--runtime",
            "io.acme:acme-bundle:1.0",
            "--deployment",
            "io.acme:acme-bundle-broken-deployment:1.0",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "io.acme:acme-rest::jar is missing in the deployment module",
        ));
}
