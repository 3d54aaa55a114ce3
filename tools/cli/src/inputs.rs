//! Action inputs.

use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use driveup_common::{Error, FolderId, Result};

/// Input names as declared by the action.
pub const FILENAME_INPUT: &str = "filename";
pub const NAME_INPUT: &str = "name";
pub const FOLDER_ID_INPUT: &str = "folderId";
pub const CREDENTIALS_INPUT: &str = "credentials";

/// Input values as received, before validation.
#[derive(Default, Clone)]
pub struct RawInputs {
    pub filename: String,
    pub name: String,
    pub folder_id: String,
    pub credentials: Zeroizing<String>,
}

impl fmt::Debug for RawInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawInputs")
            .field("filename", &self.filename)
            .field("name", &self.name)
            .field("folder_id", &self.folder_id)
            .field("credentials", &"[redacted]")
            .finish()
    }
}

/// Validated inputs of one run.
pub struct ActionInputs {
    filename: PathBuf,
    name: Option<String>,
    folder_id: FolderId,
    credentials: Zeroizing<String>,
}

impl ActionInputs {
    /// Validate raw inputs.
    ///
    /// Values are trimmed. Required inputs are checked in declaration order.
    ///
    /// # Errors
    /// - `Error::MissingInput` naming the first empty required input
    pub fn resolve(raw: RawInputs) -> Result<Self> {
        let filename = required(&raw.filename, FILENAME_INPUT)?;
        let name = Some(raw.name.trim())
            .filter(|n| !n.is_empty())
            .map(String::from);
        let folder_id = required(&raw.folder_id, FOLDER_ID_INPUT)?;
        let credentials = required(&raw.credentials, CREDENTIALS_INPUT)?;

        Ok(Self {
            filename: PathBuf::from(filename),
            name,
            folder_id: FolderId::new(folder_id)?,
            credentials: Zeroizing::new(credentials.to_string()),
        })
    }

    /// Local file to upload.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Explicit destination name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Destination folder.
    pub fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }

    /// Base64 service-account key.
    pub fn credentials(&self) -> &str {
        &self.credentials
    }
}

impl fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionInputs")
            .field("filename", &self.filename)
            .field("name", &self.name)
            .field("folder_id", &self.folder_id)
            .field("credentials", &"[redacted]")
            .finish()
    }
}

fn required<'a>(value: &'a str, input: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingInput(input.to_string()));
    }
    Ok(value)
}
