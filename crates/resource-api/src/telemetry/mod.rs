//! Telemetry setup: structured JSON logs, with optional OTLP span export.
//!
//! # Telemetry invariants
//!
//! - **No key material, internal identifiers, or decrypted claims** must
//!   appear in any span attribute or log field. Pseudonyms as received from
//!   the caller are safe to log.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
