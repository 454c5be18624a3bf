//! The inference oracle boundary.
//!
//! The enrichment engine talks to an external inference service through the
//! [`Oracle`] trait; [`OpenAiOracle`] is the production implementation and
//! tests substitute their own. Reply parsing lives in [`reply`] and must
//! tolerate non-JSON answers.

mod client;
mod openai;
pub mod reply;

pub use client::Oracle;
pub use openai::OpenAiOracle;
