// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_htr_apdu::{bip32::Bip32Path, token::TokenData};

use super::tx::TxSession;

/// Request context, holds the data for the request currently
/// awaiting confirmation or a transaction in progress
pub struct Function {
    inner: FunctionType,
}

impl Default for Function {
    fn default() -> Self {
        Self::new()
    }
}

/// Enum for internal request contexts, only one request may be active at a time
#[allow(clippy::large_enum_variant)]
enum FunctionType {
    None,

    /// Address or extended public key for a derivation path
    PublicKey(Bip32Path),

    /// Token metadata pending signature
    TokenData(TokenData),

    /// Streaming transaction
    Transaction(TxSession),
}

impl Function {
    /// Create a new / empty function context
    pub const fn new() -> Self {
        Self {
            inner: FunctionType::None,
        }
    }

    /// Setup public key context
    pub fn public_key_init(&mut self, path: &Bip32Path) {
        self.clear();
        self.inner = FunctionType::PublicKey(path.clone());
    }

    /// Fetch public key context path
    pub fn public_key(&self) -> Option<&Bip32Path> {
        match &self.inner {
            FunctionType::PublicKey(p) => Some(p),
            _ => None,
        }
    }

    /// Setup token data context
    pub fn token_data_init(&mut self, token: &TokenData) {
        self.clear();
        self.inner = FunctionType::TokenData(token.clone());
    }

    /// Fetch token data context
    pub fn token_data(&self) -> Option<&TokenData> {
        match &self.inner {
            FunctionType::TokenData(t) => Some(t),
            _ => None,
        }
    }

    /// Setup transaction context
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn tx_init(&mut self) -> &mut TxSession {
        self.clear();
        self.inner = FunctionType::Transaction(TxSession::start());

        match &mut self.inner {
            FunctionType::Transaction(t) => t,
            _ => unreachable!(),
        }
    }

    /// Fetch transaction context
    pub fn tx(&mut self) -> Option<&mut TxSession> {
        match &mut self.inner {
            FunctionType::Transaction(t) => Some(t),
            _ => None,
        }
    }

    /// Fetch transaction context (immutable)
    pub fn tx_ref(&self) -> Option<&TxSession> {
        match &self.inner {
            FunctionType::Transaction(t) => Some(t),
            _ => None,
        }
    }

    /// Clear function context, wiping any transaction in progress
    pub fn clear(&mut self) {
        if let FunctionType::Transaction(t) = &mut self.inner {
            t.wipe();
        }

        self.inner = FunctionType::None;
    }
}
