use thiserror::Error;

use duet_shared::CredentialsError;
use duet_store::StoreError;

/// Errors surfaced by the client layer.
///
/// Three families, all terminal for the triggering operation: local input
/// validation (rejected before any store access), provider errors propagated
/// verbatim, and session-state violations.  Nothing is retried.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Registration or sign-in attempted without an email or password.
    #[error("Email and password are required")]
    MissingCredentials,

    /// Friend lookup attempted with an empty email.
    #[error("Friend email is required")]
    MissingEmail,

    /// Send attempted with empty message text.
    #[error("Message text is empty")]
    EmptyMessage,

    /// Send attempted before selecting a chat peer.
    #[error("No chat peer selected")]
    NoPeerSelected,

    /// Operation requires an authenticated session.
    #[error("Not signed in")]
    NotSignedIn,

    /// Registration with an email that already has an account.
    #[error("An account already exists for this email")]
    EmailTaken,

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Users cannot add themselves to their own friend set.
    #[error("Cannot add yourself as a friend")]
    SelfFriend,

    /// The message channel behind a subscription went away.
    #[error("Subscription closed")]
    SubscriptionClosed,

    /// The shared database lock was poisoned by a panicking holder.
    #[error("State lock poisoned")]
    LockPoisoned,

    /// Stored credential columns failed to parse.
    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialsError),

    /// Store failure, propagated verbatim.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
