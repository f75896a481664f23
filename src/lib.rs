//! imu-visualizer library crate.
//!
//! Streams orientation telemetry from a serial-attached IMU and draws the
//! latest pose at a fixed frame rate. The pieces, producer to consumer:
//!
//! - [`transport`] - serial link in canonical line mode
//! - [`telemetry`] - record grammars and the decoder
//! - [`handoff`] - latest-sample slot shared by the two loops
//! - [`ingest`] - background read/decode/publish loop
//! - [`render`] - fixed-rate presentation
//! - [`app`] - session wiring and ordered teardown

pub mod app;
pub mod cli;
pub mod config;
pub mod handoff;
pub mod ingest;
pub mod render;
pub mod telemetry;
pub mod transport;
