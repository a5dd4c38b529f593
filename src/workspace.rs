use std::path::{Component, Path, PathBuf};

use crate::config::RuntimeConfig;
use crate::error::{HostError, Result};

/// Flat directory holding the uploaded bot files.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open the workspace at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names in the workspace, sorted lexicographically. Subdirectories
    /// such as the installed dependency tree are not listed.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn contains(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()),
            Err(_) => false,
        }
    }

    /// Write `content` under `name`, replacing any existing file.
    pub async fn save(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.resolve(name)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let from = self.resolve(old_name)?;
        let to = self.resolve(new_name)?;
        tokio::fs::rename(from, to).await?;
        Ok(())
    }

    /// Delete `name`. A missing file is an error.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    /// Pick the file to launch: the configured entry point if present,
    /// otherwise the first file (by name) with the script extension.
    pub async fn launch_target(&self, runtime: &RuntimeConfig) -> Result<Option<String>> {
        let files = self.list().await?;
        Ok(select_launch_target(&files, runtime))
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

pub fn select_launch_target(files: &[String], runtime: &RuntimeConfig) -> Option<String> {
    files
        .iter()
        .find(|f| **f == runtime.entry_point)
        .or_else(|| files.iter().find(|f| f.ends_with(&runtime.extension)))
        .cloned()
}

/// A workspace name must be exactly one normal path component.
fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(()),
        _ => Err(HostError::InvalidName(name.to_string())),
    }
}
