//! Masked transaction sums for the zero-knowledge sum check.
//!
//! This crate contains:
//! - The additive masking scheme and the host-side sum check that gates proving.
//! - Serialization of the witness for a prover, and parsing of the proof artifact it returns.
//! - A prover abstraction with a ZoKrates process backend and an in-process Groth16 backend.

pub mod artifact;
pub mod cipher;
pub mod circuit;
pub mod constants;
pub mod error;
pub mod field;
pub mod groth16;
pub mod pipeline;
pub mod prover;
pub mod types;
pub mod verifier;

pub use error::ZkError;
