//! Static site generation: the event data file and build/publish commands

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize site data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command is empty")]
    EmptyCommand,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code}: {stderr}")]
    ExitStatus {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Writes site inputs and runs site commands inside the site root
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    root: PathBuf,
}

impl SiteBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path relative to the site root
    pub fn path(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root.join(relative)
        }
    }

    /// Write `data` as pretty JSON, creating parent directories as needed
    pub async fn write_data(&self, relative: &Path, data: &Value) -> Result<PathBuf, SiteError> {
        let mut json = serde_json::to_string_pretty(data)?;
        json.push('\n');

        let path = self.write_file(relative, json.as_bytes()).await?;
        info!("Wrote site data to {}", path.display());
        Ok(path)
    }

    /// Write raw bytes under the site root, creating parent directories as needed
    pub async fn write_file(&self, relative: &Path, contents: &[u8]) -> Result<PathBuf, SiteError> {
        let path = self.path(relative);
        let io_err = |source| SiteError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, contents).await.map_err(io_err)?;

        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(path)
    }

    /// `file://` URL of a page under the site root; the page must exist
    pub async fn page_url(&self, relative: &Path) -> Result<String, SiteError> {
        let path = self.path(relative);
        let absolute = tokio::fs::canonicalize(&path)
            .await
            .map_err(|source| SiteError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(format!("file://{}", absolute.display()))
    }

    /// Run `argv` in the site root and return its stdout
    ///
    /// A non-zero exit status is an error carrying the process's stderr.
    pub async fn run_command(&self, argv: &[String]) -> Result<String, SiteError> {
        let (program, args) = argv.split_first().ok_or(SiteError::EmptyCommand)?;
        info!("Running {} in {}", argv.join(" "), self.root.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SiteError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", program, code, stderr);
            return Err(SiteError::ExitStatus {
                program: program.clone(),
                code,
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("{} produced {} bytes of output", program, stdout.len());
        Ok(stdout)
    }
}
