//! # duet-shared
//!
//! Types shared between the Duet store and client crates: user and channel
//! identifiers, the pairwise channel-key derivation, and password credential
//! hashing.  Everything in this crate is pure; no I/O, no async.

pub mod credentials;
pub mod types;

mod error;

pub use credentials::StoredCredential;
pub use error::CredentialsError;
pub use types::{ChannelKey, UserId};
