// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Operator prompts, rendered text for requests awaiting a decision

use heapless::String;

use ledger_htr_apdu::{
    bip32::Bip32Path,
    token::{TokenData, MAX_TOKEN_NAME_LEN, MAX_TOKEN_SYMBOL_LEN, TOKEN_UID_LEN},
    tx::PUBKEY_HASH_LEN,
};

use super::{
    config::Network,
    token::TokenRegistry,
    tx::TxSession,
    txout::TxOutput,
    Error,
};
use crate::helpers::{fmt_address, fmt_hex, fmt_output_label, fmt_token_val, B58_ADDRESS_LEN};

/// Maximum output label length (`255/255`)
pub const MAX_LABEL_LEN: usize = 7;

/// Maximum amount length, symbol, separator and a formatted u64
pub const MAX_AMOUNT_LEN: usize = MAX_TOKEN_SYMBOL_LEN + 1 + 26 + 3;

/// Amount label shown for authority outputs
pub const AUTHORITY_LABEL: &str = "authority";

/// Prompt awaiting an operator decision
#[derive(Clone, PartialEq, Debug)]
pub enum Prompt {
    /// Confirm the address for a derivation path
    Address {
        path: Bip32Path,
        address: String<B58_ADDRESS_LEN>,
    },

    /// Export the extended public key for a derivation path
    Xpub { path: Bip32Path },

    /// Issue a signature for token metadata
    TokenData {
        symbol: String<MAX_TOKEN_SYMBOL_LEN>,
        name: String<MAX_TOKEN_NAME_LEN>,
        uid: String<{ TOKEN_UID_LEN * 2 }>,
    },

    /// Rotate the token signing secret
    ResetTokenSignatures,

    /// Confirm a transaction output
    TxOutput {
        label: String<MAX_LABEL_LEN>,
        address: String<B58_ADDRESS_LEN>,
        amount: String<MAX_AMOUNT_LEN>,
    },

    /// Sign the confirmed transaction
    TxConfirm,
}

impl Prompt {
    /// Build an address prompt
    pub fn address(
        network: Network,
        path: &Bip32Path,
        pubkey_hash: &[u8; PUBKEY_HASH_LEN],
    ) -> Result<Self, Error> {
        let mut buff = [0u8; B58_ADDRESS_LEN + 1];

        Ok(Prompt::Address {
            path: path.clone(),
            address: to_string(fmt_address(network.version(), pubkey_hash, &mut buff))?,
        })
    }

    /// Build a token metadata prompt
    pub fn token_data(token: &TokenData) -> Result<Self, Error> {
        let mut buff = [0u8; TOKEN_UID_LEN * 2 + 1];

        Ok(Prompt::TokenData {
            symbol: to_string(token.symbol_str())?,
            name: to_string(token.name_str())?,
            uid: to_string(fmt_hex(&token.uid, &mut buff))?,
        })
    }

    /// Build a prompt for a transaction output
    pub fn tx_output(
        network: Network,
        tx: &TxSession,
        out: &TxOutput,
        registry: &TokenRegistry,
    ) -> Result<Self, Error> {
        let (index, total) = tx.output_label(out);
        let symbol = tx.output_symbol(out, registry)?;

        let mut buff = [0u8; MAX_AMOUNT_LEN + B58_ADDRESS_LEN];

        let label = to_string(fmt_output_label(index, total, &mut buff))?;
        let address = to_string(fmt_address(network.version(), &out.pubkey_hash, &mut buff))?;
        let amount = match out.token.is_authority() {
            true => to_string(AUTHORITY_LABEL)?,
            false => to_string(fmt_token_val(symbol, out.value, &mut buff))?,
        };

        #[cfg(feature = "log")]
        log::debug!("output {}: {} to {}", label, amount, address);

        Ok(Prompt::TxOutput {
            label,
            address,
            amount,
        })
    }
}

/// Copy a rendered string into a bounded [String]
fn to_string<const N: usize>(s: &str) -> Result<String<N>, Error> {
    let mut v = String::new();
    v.push_str(s).map_err(|_| Error::EncodingFailed)?;
    Ok(v)
}
