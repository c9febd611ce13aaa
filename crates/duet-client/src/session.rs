//! Session state and orchestration.
//!
//! The [`SessionController`] keeps all session state explicit rather than
//! ambient: who is signed in, which peer is selected, and the single open
//! channel subscription.  All user-facing operations flow through it.

use tracing::debug;

use duet_shared::{ChannelKey, UserId};
use duet_store::Message;

use crate::auth::Authenticator;
use crate::channel::{MessageChannel, Subscription};
use crate::directory::{FriendDirectory, FriendEntry};
use crate::error::{ClientError, Result};
use crate::SharedDb;

/// Authentication and chat-selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn {
        user: UserId,
        /// The currently selected chat peer, if any.
        peer: Option<UserId>,
    },
}

/// Orchestrates the authenticator, friend directory, and message channel.
///
/// Invariant: at most one channel subscription is open at any time.
/// Selecting a new peer closes the previous subscription before opening the
/// next, so a stale channel can never deliver into the current view.
pub struct SessionController {
    auth: Authenticator,
    directory: FriendDirectory,
    channel: MessageChannel,
    state: SessionState,
    subscription: Option<Subscription>,
}

impl SessionController {
    /// Build a controller over a shared store and its live-query engine.
    ///
    /// The [`MessageChannel`] carries the store's subscription feeds; every
    /// client of the same store must share one instance (clone it), otherwise
    /// sends from one client would never reach another's subscription.
    pub fn new(db: SharedDb, channel: MessageChannel) -> Self {
        Self {
            auth: Authenticator::new(db.clone()),
            directory: FriendDirectory::new(db),
            channel,
            state: SessionState::SignedOut,
            subscription: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn channel(&self) -> &MessageChannel {
        &self.channel
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Register a new account; on success the session is signed in.
    pub fn register(&mut self, email: &str, password: &str) -> Result<UserId> {
        let user = self.auth.register(email, password)?;
        self.state = SessionState::SignedIn {
            user: user.clone(),
            peer: None,
        };
        Ok(user)
    }

    /// Sign in with existing credentials.
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<UserId> {
        let user = self.auth.sign_in(email, password)?;
        self.state = SessionState::SignedIn {
            user: user.clone(),
            peer: None,
        };
        Ok(user)
    }

    /// Sign out, closing any open subscription.
    pub fn sign_out(&mut self) {
        self.subscription = None;
        self.state = SessionState::SignedOut;
        self.auth.sign_out();
    }

    // ------------------------------------------------------------------
    // Friends
    // ------------------------------------------------------------------

    /// Look a user up by email and add them to the signed-in user's friend
    /// set.  `Ok(None)` means no user matched; a normal negative result.
    pub fn add_friend_by_email(&self, email: &str) -> Result<Option<FriendEntry>> {
        let user = self.current_user()?;

        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::MissingEmail);
        }

        let Some(found) = self.directory.find_user_by_email(email)? else {
            return Ok(None);
        };

        self.directory.add_friend(&user, &found.id)?;
        Ok(Some(FriendEntry {
            id: found.id,
            email: found.email,
        }))
    }

    /// The signed-in user's friend list, resolved for display.
    pub fn friends(&self) -> Result<Vec<FriendEntry>> {
        let user = self.current_user()?;
        self.directory.list_friends(&user)
    }

    // ------------------------------------------------------------------
    // Chat selection and sending
    // ------------------------------------------------------------------

    /// Select a chat peer, swapping the live subscription over to the
    /// pairwise channel shared with them.
    pub fn select_peer(&mut self, peer: UserId) -> Result<ChannelKey> {
        let user = self.current_user()?;

        // Close the previous channel before opening the new one.
        if let Some(old) = self.subscription.take() {
            debug!(channel = %old.channel_key(), "closing previous subscription");
        }

        let key = ChannelKey::derive(&user, &peer);
        self.subscription = Some(self.channel.open(&key)?);
        self.state = SessionState::SignedIn {
            user,
            peer: Some(peer),
        };
        Ok(key)
    }

    /// The subscription for the currently selected peer.
    pub fn subscription_mut(&mut self) -> Option<&mut Subscription> {
        self.subscription.as_mut()
    }

    /// Send a message to the currently selected peer.
    pub fn send_message(&self, text: &str) -> Result<Message> {
        let user = self.current_user()?;
        let peer = match &self.state {
            SessionState::SignedIn { peer: Some(p), .. } => p.clone(),
            _ => return Err(ClientError::NoPeerSelected),
        };

        let key = ChannelKey::derive(&user, &peer);
        self.channel.send(&key, &user, text)
    }

    fn current_user(&self) -> Result<UserId> {
        match &self.state {
            SessionState::SignedIn { user, .. } => Ok(user.clone()),
            SessionState::SignedOut => Err(ClientError::NotSignedIn),
        }
    }
}
