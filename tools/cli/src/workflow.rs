//! GitHub Actions workflow commands.
//!
//! Every message passes through the run's [`SecretSet`] before it is written.
//! Only `::add-mask::` directives carry a secret verbatim, since that is how
//! the runner learns what to hide.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use driveup_common::{Error, Result, SecretSet};

/// Escape a command message (`%`, `\r`, `\n`).
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property (data escaping plus `:` and `,`).
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Writer for workflow commands and step outputs.
pub struct Workflow<W: Write> {
    out: W,
    secrets: SecretSet,
    output_file: Option<PathBuf>,
}

impl Workflow<io::Stdout> {
    /// Commands on stdout, outputs appended to `output_file` when set.
    pub fn stdout(secrets: SecretSet, output_file: Option<PathBuf>) -> Self {
        Self::new(io::stdout(), secrets, output_file)
    }
}

impl<W: Write> Workflow<W> {
    /// Create a workflow writer over `out`.
    pub fn new(out: W, secrets: SecretSet, output_file: Option<PathBuf>) -> Self {
        Self {
            out,
            secrets,
            output_file,
        }
    }

    /// Masking set consulted by this writer.
    pub fn secrets(&self) -> &SecretSet {
        &self.secrets
    }

    /// Register `value` for masking, locally and with the runner.
    pub fn add_mask(&mut self, value: &str) -> Result<()> {
        if self.secrets.register(value) {
            writeln!(self.out, "::add-mask::{}", escape_data(value))?;
        }
        Ok(())
    }

    /// Emit a debug message (shown when step debug logging is on).
    pub fn debug(&mut self, message: &str) -> Result<()> {
        self.command("debug", message)
    }

    /// Emit a warning annotation.
    pub fn warning(&mut self, message: &str) -> Result<()> {
        self.command("warning", message)
    }

    /// Emit an error annotation.
    pub fn error(&mut self, message: &str) -> Result<()> {
        self.command("error", message)
    }

    /// Report a fatal failure. Write errors are ignored, the caller exits anyway.
    pub fn fatal(&mut self, message: &str) {
        let _ = self.error(message);
        let _ = self.out.flush();
    }

    /// Set the file step outputs are appended to.
    pub fn set_output_file(&mut self, output_file: Option<PathBuf>) {
        self.output_file = output_file;
    }

    /// Publish a step output.
    pub fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        match self.output_file.clone() {
            Some(path) => append_output(&path, name, value),
            None => {
                writeln!(
                    self.out,
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                )?;
                Ok(())
            }
        }
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn command(&mut self, command: &str, message: &str) -> Result<()> {
        let masked = self.secrets.mask(message);
        writeln!(self.out, "::{}::{}", command, escape_data(&masked))?;
        Ok(())
    }
}

/// Append `name<<delimiter` block to the `GITHUB_OUTPUT` file.
fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(Error::InvalidInput(format!(
            "output {:?} contains the heredoc delimiter",
            name
        )));
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(file, "{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)?;
    Ok(())
}
