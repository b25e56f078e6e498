use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated environment for one binary invocation.
///
/// The config path points into a private temp directory, so the user's own
/// configuration never leaks into a test.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("explorer").join("config.toml")
    }

    pub fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("explorer.json")
    }

    /// `explorer` with colors off and the config redirected.
    pub fn explorer_command(&self) -> Command {
        let mut cmd = Command::cargo_bin("explorer").expect("Failed to find explorer binary");
        cmd.env("NO_COLOR", "1")
            .env("EXPLORER_CONFIG_PATH", self.config_path())
            .env("EXPLORER_FIXTURE", Self::fixture_path())
            .env_remove("RUST_LOG");
        cmd
    }
}
