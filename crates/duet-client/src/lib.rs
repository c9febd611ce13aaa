//! # duet-client
//!
//! Client core for the Duet one-to-one messenger: account registration and
//! sign-in, friend lookup by email, live pairwise message channels, and the
//! session controller that orchestrates them.
//!
//! The presentation layer is an external collaborator: it consumes the
//! serde-serializable friend lists and message snapshots exposed here and
//! feeds user input (peer selection, message text) back in.

pub mod auth;
pub mod channel;
pub mod directory;
pub mod session;

mod error;

use std::sync::{Arc, Mutex};

use tracing_subscriber::{fmt, EnvFilter};

use duet_store::Database;

pub use auth::Authenticator;
pub use channel::{MessageChannel, Snapshot, Subscription};
pub use directory::{FriendDirectory, FriendEntry};
pub use error::{ClientError, Result};
pub use session::{SessionController, SessionState};

/// Database handle shared across the client components.
pub type SharedDb = Arc<Mutex<Database>>;

/// Wrap an open database for use by the client components.
pub fn shared_db(db: Database) -> SharedDb {
    Arc::new(Mutex::new(db))
}

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise defaults to debug output for the
/// Duet crates and warnings for everything else.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("duet_client=debug,duet_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
