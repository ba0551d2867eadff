// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Token metadata signing and the per-session token registry
//!
//! Token signatures bind a token uid to its symbol and name using the device [Secret],
//! allowing metadata approved once by the operator to be declared prior to a transaction
//! and displayed without further confirmation.

use encdec::Decode;
use heapless::{String, Vec};
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};

use ledger_htr_apdu::token::{
    SignedTokenData, TokenData, TokenSig, TokenUid, MAX_TOKEN_NAME_LEN, MAX_TOKEN_SYMBOL_LEN,
    TOKEN_UID_LEN,
};

use super::{
    secret::{Secret, SecretStore, Storage, SECRET_LEN},
    Error,
};

/// Maximum number of custom tokens in a transaction
pub const TX_MAX_TOKENS: usize = 10;

/// Maximum token signature message length
pub const MAX_MESSAGE_LEN: usize =
    SECRET_LEN + TOKEN_UID_LEN + MAX_TOKEN_SYMBOL_LEN + MAX_TOKEN_NAME_LEN + 1;

/// Build the token signature message,
/// `secret ‖ uid ‖ symbol ‖ name ‖ version`
pub fn message(secret: &Secret, token: &TokenData) -> Vec<u8, MAX_MESSAGE_LEN> {
    let mut m = Vec::new();

    // Field lengths are bounded by [TokenData] so these cannot exceed the message capacity
    let _ = m.extend_from_slice(secret.as_bytes());
    let _ = m.extend_from_slice(&token.uid);
    let _ = m.extend_from_slice(&token.symbol);
    let _ = m.extend_from_slice(&token.name);
    let _ = m.push(token.version);

    m
}

/// Compute the signature for a token record
pub fn sign(secret: &Secret, token: &TokenData) -> TokenSig {
    let mut m = message(secret, token);
    let h = Sha256::digest(&m);

    zeroize::Zeroize::zeroize(&mut m[..]);

    let mut sig = [0u8; 32];
    sig.copy_from_slice(&h);
    sig
}

/// Check a token signature, comparing every byte regardless of mismatch position
pub fn verify(secret: &Secret, token: &TokenData, signature: &TokenSig) -> bool {
    let expected = sign(secret, token);

    expected
        .iter()
        .zip(signature.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Parse a signed token record and check its signature against the current secret.
///
/// Malformed records and mismatched signatures both return [Error::InvalidSignature].
pub fn verify_from_wire<S: Storage, R: CryptoRngCore>(
    buff: &[u8],
    secrets: &mut SecretStore<S, R>,
) -> Result<TokenData, Error> {
    let (signed, _n) = match SignedTokenData::decode(buff) {
        Ok(v) => v,
        Err(_e) => {
            #[cfg(feature = "log")]
            log::warn!("failed to parse signed token: {:?}", _e);

            return Err(Error::InvalidSignature);
        }
    };

    let secret = secrets.read()?;

    match verify(&secret, &signed.token, &signed.signature) {
        true => Ok(signed.token),
        false => Err(Error::InvalidSignature),
    }
}

/// Declared token entry, uid and display symbol
#[derive(Clone, PartialEq, Debug)]
pub struct TokenSymbol {
    pub uid: TokenUid,
    pub symbol: String<MAX_TOKEN_SYMBOL_LEN>,
}

impl TokenSymbol {
    fn from_token(t: &TokenData) -> Self {
        let mut symbol = String::new();
        // Display symbol is the printable prefix, always within capacity
        let _ = symbol.push_str(t.symbol_str());

        Self { uid: t.uid, symbol }
    }
}

/// Registry of tokens declared for the current transaction
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TokenRegistry {
    entries: Vec<TokenSymbol, TX_MAX_TOKENS>,
}

impl TokenRegistry {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Remove all declared tokens
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Declare a signed token from a wire record.
    ///
    /// Declaring more than [TX_MAX_TOKENS] tokens clears the registry
    /// and returns [Error::CapacityExceeded].
    pub fn declare<S: Storage, R: CryptoRngCore>(
        &mut self,
        buff: &[u8],
        secrets: &mut SecretStore<S, R>,
    ) -> Result<(), Error> {
        if self.entries.is_full() {
            #[cfg(feature = "log")]
            log::warn!("token registry full, resetting");

            self.reset();
            return Err(Error::CapacityExceeded);
        }

        let token = verify_from_wire(buff, secrets)?;

        #[cfg(feature = "log")]
        log::debug!("declared token {}: {:02x?}", token.symbol_str(), token.uid);

        self.entries
            .push(TokenSymbol::from_token(&token))
            .map_err(|_| Error::CapacityExceeded)
    }

    /// Find the index of a declared token by uid
    pub fn find(&self, uid: &TokenUid) -> Option<usize> {
        self.entries.iter().position(|e| &e.uid == uid)
    }

    /// Fetch a declared token by index
    pub fn get(&self, index: usize) -> Option<&TokenSymbol> {
        self.entries.get(index)
    }

    /// Number of declared tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
