//! Log output with secret masking.
//!
//! `tracing` events are formatted by `tracing-subscriber` and written through
//! [`MaskingMakeWriter`], which consults the run's [`SecretSet`] on every write.

use std::io::{self, Write};

use anyhow::Result;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use driveup_common::SecretSet;

use crate::config::Settings;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "DRIVEUP_LOG";

/// [`MakeWriter`] wrapping another one and masking everything written.
#[derive(Clone)]
pub struct MaskingMakeWriter<M> {
    inner: M,
    secrets: SecretSet,
}

impl<M> MaskingMakeWriter<M> {
    pub fn new(inner: M, secrets: SecretSet) -> Self {
        Self { inner, secrets }
    }
}

impl<'a, M> MakeWriter<'a> for MaskingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = MaskingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter {
            inner: self.inner.make_writer(),
            secrets: self.secrets.clone(),
        }
    }
}

/// Writer that replaces registered secrets before forwarding.
///
/// The fmt layer writes each event with a single call, so a secret never
/// straddles two writes.
pub struct MaskingWriter<W> {
    inner: W,
    secrets: SecretSet,
}

impl<W: Write> Write for MaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let masked = self.secrets.mask(&text);
        self.inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Install the global subscriber, logging to stderr.
pub fn init(settings: &Settings, secrets: SecretSet) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(settings.default_log_level()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(MaskingMakeWriter::new(io::stderr, secrets))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
