use serde::{Deserialize, Serialize};

/// Separator between the two ordered identifiers in a channel key.
///
/// User identifiers are UUID strings assigned by the authenticator, so the
/// underscore can never occur inside one and the derivation stays injective.
const CHANNEL_KEY_SEPARATOR: char = '_';

// User identity = opaque string assigned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identifier of a two-party conversation.
///
/// Derived from an unordered pair of user identifiers; swapping the inputs
/// yields an identical key, so both participants address the same channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Derive the channel key for a pair of users.
    ///
    /// Pure and total: orders the pair lexicographically and joins with the
    /// separator.  Defined even for `derive(x, x)`; whether self-chat is
    /// allowed is a friend-directory policy, not a derivation concern.
    pub fn derive(a: &UserId, b: &UserId) -> Self {
        let (first, second) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        Self(format!("{}{}{}", first.0, CHANNEL_KEY_SEPARATOR, second.0))
    }

    /// The two participant identifiers encoded in this key.
    pub fn participants(&self) -> (UserId, UserId) {
        match self.0.split_once(CHANNEL_KEY_SEPARATOR) {
            Some((a, b)) => (UserId(a.to_string()), UserId(b.to_string())),
            // Degenerate single-id key; only reachable through from_raw.
            None => (UserId(self.0.clone()), UserId(self.0.clone())),
        }
    }

    /// Reconstruct a key from its stored string form.
    pub fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_order_independent() {
        let a = UserId::from("u1");
        let b = UserId::from("u2");
        assert_eq!(ChannelKey::derive(&a, &b), ChannelKey::derive(&b, &a));
        assert_eq!(ChannelKey::derive(&a, &b).as_str(), "u1_u2");
    }

    #[test]
    fn distinct_pairs_get_distinct_keys() {
        let ids: Vec<UserId> = ["alpha", "beta", "gamma", "delta"]
            .iter()
            .map(|s| UserId::from(*s))
            .collect();

        let mut keys = std::collections::HashSet::new();
        for i in 0..ids.len() {
            for j in i..ids.len() {
                keys.insert(ChannelKey::derive(&ids[i], &ids[j]));
            }
        }
        // 4 users -> 10 unordered pairs including self-pairs.
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn self_pair_is_defined() {
        let x = UserId::from("solo");
        let key = ChannelKey::derive(&x, &x);
        assert_eq!(key.as_str(), "solo_solo");
        let (p, q) = key.participants();
        assert_eq!(p, x);
        assert_eq!(q, x);
    }

    #[test]
    fn participants_round_trip() {
        let a = UserId::from("2b1f0a9c");
        let b = UserId::from("0c44d871");
        let (p, q) = ChannelKey::derive(&a, &b).participants();
        // Lexicographic order, not argument order.
        assert_eq!(p, b);
        assert_eq!(q, a);
    }
}
