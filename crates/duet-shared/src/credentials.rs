//! Password credential hashing.
//!
//! Passwords are never stored in the clear: the store keeps a random 16-byte
//! salt and the BLAKE3 digest of `salt || password`, both hex-encoded.

use rand::RngCore;

use crate::error::CredentialsError;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// A salted password digest in its storable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    salt: [u8; SALT_LEN],
    digest: blake3::Hash,
}

impl StoredCredential {
    /// Hash a password under a freshly generated random salt.
    pub fn hash_password(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = digest_with_salt(&salt, password);
        Self { salt, digest }
    }

    /// Check a password attempt against this credential.
    pub fn verify(&self, password: &str) -> bool {
        // blake3::Hash comparison is constant-time.
        digest_with_salt(&self.salt, password) == self.digest
    }

    /// Hex-encoded salt, as persisted.
    pub fn salt_hex(&self) -> String {
        hex::encode(self.salt)
    }

    /// Hex-encoded digest, as persisted.
    pub fn digest_hex(&self) -> String {
        self.digest.to_hex().to_string()
    }

    /// Rebuild a credential from its persisted hex columns.
    pub fn from_hex(salt_hex: &str, digest_hex: &str) -> Result<Self, CredentialsError> {
        let salt_bytes = hex::decode(salt_hex)?;
        if salt_bytes.len() != SALT_LEN {
            return Err(CredentialsError::InvalidSaltLength {
                expected: SALT_LEN,
                got: salt_bytes.len(),
            });
        }
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&salt_bytes);

        let digest_bytes = hex::decode(digest_hex)?;
        if digest_bytes.len() != blake3::OUT_LEN {
            return Err(CredentialsError::InvalidDigestLength {
                expected: blake3::OUT_LEN,
                got: digest_bytes.len(),
            });
        }
        let mut digest = [0u8; blake3::OUT_LEN];
        digest.copy_from_slice(&digest_bytes);

        Ok(Self {
            salt,
            digest: blake3::Hash::from(digest),
        })
    }
}

fn digest_with_salt(salt: &[u8; SALT_LEN], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}
