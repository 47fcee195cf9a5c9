//! Domain types and pure helpers for the virtual try-on generator.
//!
//! Everything here is independent of the transport: request validation,
//! submission/poll outcome types, the response normalizer that tolerates
//! the loosely-typed workflow engine, the share-link rewriter, and the
//! session identity provider.

pub mod error;
pub mod identity;
pub mod job;
pub mod normalize;
pub mod outcome;
pub mod share_link;
pub mod types;
