pub mod compiler;
pub mod config;
pub mod constants;
pub mod error;
pub mod interpolate;
pub mod locator;
pub mod logging;
pub mod report;
pub mod runner;
pub mod spec;
pub mod transcript;
pub mod verifier;

pub use compiler::{compile, CompiledSpec, CorrelationMap, RequestId};
pub use config::TestSpecConfig;
pub use error::{Result, TestSpecError};
pub use interpolate::{interpolate, Variables};
pub use report::ErrorRecord;
pub use runner::{CommandProcessor, ReplayProcessor};
pub use spec::{LspTestSpec, MessageSpec, RequestOptions};
pub use transcript::{client_request_key, Transcript, TranscriptEntry};
pub use verifier::Verifier;
