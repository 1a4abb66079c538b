//! The classification and import engine.
//!
//! [`classify`] evaluates one parcel against the loaded rule and
//! vocabulary snapshot; [`import`] drives whole-register ingestion and
//! validation as background jobs with progress and cancellation.

pub mod classify;
pub mod import;
