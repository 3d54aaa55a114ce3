//! Command-line and environment configuration.
//!
//! Inputs follow the GitHub Actions convention (`INPUT_<NAME>` variables) and
//! can be overridden with flags for local runs.

use clap::Parser;
use std::path::PathBuf;
use zeroize::Zeroizing;

use driveup_common::Result;
use driveup_storage::UploadEndpoint;

use crate::inputs::RawInputs;

#[derive(Parser)]
#[command(name = "driveup")]
#[command(about = "Upload a file to Google Drive and publish its link")]
#[command(version)]
pub struct Cli {
    /// Path of the local file to upload.
    #[arg(long, env = "INPUT_FILENAME", default_value = "", hide_default_value = true)]
    pub filename: String,

    /// Name of the file in Drive (default: the file's base name).
    #[arg(long, env = "INPUT_NAME", default_value = "", hide_default_value = true)]
    pub name: String,

    /// Identifier of the destination folder.
    #[arg(long = "folder-id", env = "INPUT_FOLDERID", default_value = "", hide_default_value = true)]
    pub folder_id: String,

    /// Base64-encoded service-account JSON key.
    #[arg(
        long,
        env = "INPUT_CREDENTIALS",
        default_value = "",
        hide_default_value = true,
        hide_env_values = true
    )]
    pub credentials: String,

    /// File that step outputs are appended to.
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,

    /// Override the Drive upload API base URL.
    #[arg(long, env = "DRIVEUP_UPLOAD_BASE")]
    pub upload_base: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Set to `1` by the runner when step debug logging is enabled.
    #[arg(long, env = "RUNNER_DEBUG", default_value = "", hide = true)]
    pub runner_debug: String,
}

impl Cli {
    /// Raw input values; taking them leaves the credential field empty.
    pub fn take_inputs(&mut self) -> RawInputs {
        RawInputs {
            filename: self.filename.clone(),
            name: self.name.clone(),
            folder_id: self.folder_id.clone(),
            credentials: Zeroizing::new(std::mem::take(&mut self.credentials)),
        }
    }

    /// Runtime settings.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if the upload base URL is invalid
    pub fn settings(&self) -> Result<Settings> {
        let upload_endpoint = match self.upload_base.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => UploadEndpoint::new(base)?,
            _ => UploadEndpoint::default(),
        };

        Ok(Settings {
            verbose: self.verbose || self.runner_debug.trim() == "1",
            github_output: self
                .github_output
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            upload_endpoint,
        })
    }
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Debug-level logging.
    pub verbose: bool,
    /// `GITHUB_OUTPUT` file, if the runner provided one.
    pub github_output: Option<PathBuf>,
    /// Drive upload API.
    pub upload_endpoint: UploadEndpoint,
}

impl Settings {
    /// Log filter used when `DRIVEUP_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
