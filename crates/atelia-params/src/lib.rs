//! The compact key-coded parameter mini-language used to configure
//! generation requests (`cc-2 t-0.7 ar-16:9 ...`).
//!
//! Parsing is total: unrecognised tokens and malformed values are dropped,
//! never surfaced as errors. A recognised code with an empty value is kept
//! as an explicit clear marker, which removes the key on merge.

pub mod key;
pub mod set;

pub use {key::ParamKey, set::ParamSet};
