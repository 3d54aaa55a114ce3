//! driveup - upload a file to Google Drive from a CI workflow step.
//!
//! The run is a single sequential pipeline: resolve inputs, decode and mask
//! the service-account key, authorize, upload, and publish the `link` output.

pub mod config;
pub mod credentials;
pub mod inputs;
pub mod logging;
pub mod uploader;
pub mod workflow;

pub use config::{Cli, Settings};
pub use credentials::{decode_credentials, DecodedCredentials};
pub use inputs::{ActionInputs, RawInputs};
pub use uploader::{run, Outcome, LINK_OUTPUT};
pub use workflow::Workflow;
