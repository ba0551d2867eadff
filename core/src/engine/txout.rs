// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction output decoding

use ledger_htr_apdu::tx::{
    P2PKH_PREFIX, P2PKH_SCRIPT_LEN, P2PKH_SUFFIX, PUBKEY_HASH_LEN, TOKEN_AUTHORITY_MASK,
    TOKEN_INDEX_MASK,
};

use zeroize::Zeroize;

use crate::helpers::{Cursor, Exhausted};

/// Output decoding errors
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum DecodeError {
    /// More bytes are required to decode the output
    Truncated,
    /// Output value is not representable
    InvalidValue,
    /// Output script is not a supported P2PKH script
    InvalidScript,
}

impl From<Exhausted> for DecodeError {
    fn from(_: Exhausted) -> Self {
        DecodeError::Truncated
    }
}

/// Output token reference, authority flag (bit 7) and token index (bits 0-6)
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct TokenRef(pub u8);

impl TokenRef {
    /// Token index, 0 for the native token, `n` for the `n-1`th transaction token
    pub fn index(&self) -> u8 {
        self.0 & TOKEN_INDEX_MASK
    }

    /// Check whether the output is an authority output
    pub fn is_authority(&self) -> bool {
        self.0 & TOKEN_AUTHORITY_MASK != 0
    }
}

/// Decoded transaction output
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct TxOutput {
    /// Index of the output in the transaction
    pub index: u8,
    /// Recipient public key hash
    pub pubkey_hash: [u8; PUBKEY_HASH_LEN],
    /// Output value
    pub value: u64,
    /// Token reference
    pub token: TokenRef,
}

impl Zeroize for TxOutput {
    fn zeroize(&mut self) {
        self.index.zeroize();
        self.pubkey_hash.zeroize();
        self.value.zeroize();
        self.token.0.zeroize();
    }
}

impl TxOutput {
    /// Decode an output from the cursor.
    ///
    /// Values are encoded as a 4-byte integer, or an 8-byte negated integer
    /// when the high bit is set. Only P2PKH scripts are accepted.
    pub fn decode(c: &mut Cursor, index: u8) -> Result<Self, DecodeError> {
        let value = match c.peek_u8()? & 0x80 {
            0 => c.read_u32()? as u64,
            _ => {
                let v = c.read_i64()?;
                if v >= 0 {
                    return Err(DecodeError::InvalidValue);
                }
                v.unsigned_abs()
            }
        };

        let token = TokenRef(c.read_u8()?);

        let script_len = c.read_u16()? as usize;
        if script_len != P2PKH_SCRIPT_LEN {
            return Err(DecodeError::InvalidScript);
        }

        let script = c.read_bytes(script_len)?;
        if script[..P2PKH_PREFIX.len()] != P2PKH_PREFIX
            || script[P2PKH_SCRIPT_LEN - P2PKH_SUFFIX.len()..] != P2PKH_SUFFIX
        {
            return Err(DecodeError::InvalidScript);
        }

        let mut pubkey_hash = [0u8; PUBKEY_HASH_LEN];
        pubkey_hash.copy_from_slice(&script[P2PKH_PREFIX.len()..][..PUBKEY_HASH_LEN]);

        Ok(Self {
            index,
            pubkey_hash,
            value,
            token,
        })
    }
}
