use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gym(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gym").unwrap();
    cmd.env("GYM_CLI_HOME", home.path())
        .env("GYM_BASE_URL", "http://127.0.0.1:9")
        .env_remove("GYM_CLI_CONFIG")
        .env_remove("EXERCISEDB_API_KEY")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn test_help_command() {
    let home = TempDir::new().unwrap();
    gym(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gym App membership backend"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("exercises"))
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    gym(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let home = TempDir::new().unwrap();
    gym(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_gym"));
}

#[test]
fn test_config_init_writes_defaults() {
    let home = TempDir::new().unwrap();
    gym(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));

    assert!(home.path().join("config.toml").exists());

    gym(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:9/api/v1"));
}

#[test]
fn test_whoami_without_session() {
    let home = TempDir::new().unwrap();
    gym(&home)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));
}

#[test]
fn test_protected_command_requires_login() {
    let home = TempDir::new().unwrap();
    gym(&home)
        .args(["favorites", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "gym login --return-to /dashboard/user/favourite-exercises",
        ));
}
