//! Telemetry decoding.
//!
//! - [`Grammar`] - the firmware's textual record formats and the decoder
//! - [`OrientationSample`] - the decoded pose reading

mod grammar;
mod sample;

pub use grammar::Grammar;
pub use sample::OrientationSample;
