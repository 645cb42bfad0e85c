//! Common types shared across the energy data holder crates: CDR wire
//! payloads and the CDR error catalogue.

pub mod error;
pub mod protocol;

pub use error::{CdsError, ErrorList};
