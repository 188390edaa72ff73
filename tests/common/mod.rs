use std::path::PathBuf;

use anyhow::Result;
use assert_cmd::assert::Assert;
use assert_cmd::Command;
use tempfile::TempDir;

pub mod prelude {
    pub use super::Env;
    pub use anyhow::Result;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;
    pub use predicates::str;
}

/// An isolated home directory, so settings and data never touch the real one.
pub struct Env {
    pub home: TempDir,
}

#[allow(dead_code)]
impl Env {
    pub fn new() -> Result<Self> {
        Ok(Self {
            home: TempDir::new()?,
        })
    }

    /// Initialized and signed in.
    pub fn ready() -> Result<Self> {
        let env = Self::new()?;
        let data_dir = env.data_dir();
        env.run(&["init", "--data-dir", data_dir.to_str().unwrap_or_default()])?
            .success();
        env.run(&["login", "Ada"])?.success();
        Ok(env)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home.path().join("outlay-data")
    }

    pub fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("outlay")?;
        cmd.env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("OUTLAY_LOG");
        Ok(cmd)
    }

    pub fn run(&self, args: &[&str]) -> Result<Assert> {
        Ok(self.command()?.args(args).assert())
    }
}
