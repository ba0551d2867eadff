// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Token signing secret, lazily generated and rotatable

use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use super::Error;

/// Token signing secret length
pub const SECRET_LEN: usize = 32;

/// Device-local secret used to sign token metadata
#[derive(Clone, PartialEq)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    /// Create a secret from raw bytes
    pub const fn from_bytes(b: [u8; SECRET_LEN]) -> Self {
        Self(b)
    }

    /// Access raw secret bytes
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    fn random<R: CryptoRngCore>(rng: &mut R) -> Self {
        let mut b = [0u8; SECRET_LEN];
        rng.fill_bytes(&mut b);
        Self(b)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Secrets are never printed
impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Secret(..)")
    }
}

/// [`Storage`] trait provides persistence for the token signing [`Secret`]
pub trait Storage {
    /// Load the persisted secret, `None` if no secret has been written
    fn load(&self) -> Result<Option<Secret>, Error>;

    /// Persist a secret, replacing any prior value
    fn store(&mut self, secret: &Secret) -> Result<(), Error>;
}

impl<T: Storage> Storage for &mut T {
    fn load(&self) -> Result<Option<Secret>, Error> {
        T::load(self)
    }

    fn store(&mut self, secret: &Secret) -> Result<(), Error> {
        T::store(self, secret)
    }
}

/// Secret store, generates a secret on first use and
/// rotates it on demand using the provided RNG
pub struct SecretStore<S: Storage, R: CryptoRngCore> {
    storage: S,
    rng: R,
}

impl<S: Storage, R: CryptoRngCore> SecretStore<S, R> {
    pub const fn new(storage: S, rng: R) -> Self {
        Self { storage, rng }
    }

    /// Fetch the current secret, generating and persisting one if none exists
    pub fn read(&mut self) -> Result<Secret, Error> {
        match self.storage.load()? {
            Some(s) => Ok(s),
            None => self.rotate(),
        }
    }

    /// Replace the current secret with a freshly generated one,
    /// all previously issued token signatures become invalid
    pub fn rotate(&mut self) -> Result<Secret, Error> {
        let s = Secret::random(&mut self.rng);

        if let Err(e) = self.storage.store(&s) {
            #[cfg(feature = "log")]
            log::error!("failed to persist secret: {:?}", e);

            return Err(e);
        }

        Ok(s)
    }

    /// Access the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
