//! Turns each checker's native output into a [`DiagnosticReport`].
//!
//! Command construction lives in `adapters`; everything that interprets tool
//! output lives here so that moving a checker to a different output format
//! only touches one module.
//!
//! [`DiagnosticReport`]: crate::models::DiagnosticReport

pub mod error_log;
pub mod prefixed_lines;
pub mod pyright_json;
