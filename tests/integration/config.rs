use predicates::prelude::*;

use super::common::TestEnvironment;

#[test]
fn test_config_path_uses_env_override() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env.config_path().to_string_lossy().to_string()));
}

#[test]
fn test_config_init_then_show() {
    let env = TestEnvironment::new();

    env.explorer_command().args(["config", "init"]).assert().success().stdout(predicate::str::contains("Created"));
    assert!(env.config_path().exists());

    env.explorer_command()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config already exists"));

    env.explorer_command()
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Engine Configuration"))
        .stdout(predicate::str::contains("default_limit = 20"))
        .stdout(predicate::str::contains("not found").not());
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    let env = TestEnvironment::new();

    env.explorer_command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, using defaults"))
        .stdout(predicate::str::contains("boolean_true = \"yes\""));
}

#[test]
fn test_custom_limit_applies_to_list() {
    let env = TestEnvironment::new();
    let path = env.temp_dir.path().join("custom.toml");
    std::fs::write(&path, "[section]\ndefault_limit = 2\n").unwrap();

    env.explorer_command()
        .arg("--config")
        .arg(&path)
        .args(["list", "UserEntity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 3 rows, page 0 (limit 2)"));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    let env = TestEnvironment::new();

    env.explorer_command().args(["--verbose", "--quiet", "config", "path"]).assert().failure();
}
