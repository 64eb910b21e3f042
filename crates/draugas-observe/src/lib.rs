//! Tracing and OpenTelemetry setup shared by the Draugas binaries.

pub mod tracing_setup;
