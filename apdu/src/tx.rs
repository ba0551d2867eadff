// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing APDUs and wire constants
//!
//! Transactions are streamed to the device as a sequence of [SignTxReq] chunks,
//! the concatenated chunk payloads form the following byte stream:
//!
//! ```text
//! change preamble (not signed):
//!   version: u8 (CHANGE_INFO_VERSION)
//!   change_len: u8
//!   change_len x { output_index: u8, path: Bip32Path }
//! transaction (signed):
//!   tx_version: u16
//!   num_tokens: u8, num_inputs: u8, num_outputs: u8
//!   num_tokens x token_uid [u8; 32]
//!   num_inputs x { tx_id [u8; 32], index: u8, data_len: u16 (must be 0) }
//!   num_outputs x { value: u32 | i64, token_data: u8, script_len: u16, script }
//! ```
//!
//! Chunks are sent with [SignTxStage::Data] followed by a final [SignTxStage::Sign] chunk,
//! once the operator has approved the transaction a [SignTxStage::Done] request returns
//! the signature.

use encdec::{Decode, DecodeOwned, Encode};
use heapless::Vec;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use super::{ApduError, ApduStatic, Instruction, HTR_APDU_CLA};
use crate::bip32::Bip32Path;

/// Change preamble version
pub const CHANGE_INFO_VERSION: u8 = 0x01;

/// Public key hash length
pub const PUBKEY_HASH_LEN: usize = 20;

/// P2PKH script prefix, `OP_DUP OP_HASH160 <20>`
pub const P2PKH_PREFIX: [u8; 3] = [0x76, 0xa9, 0x14];

/// P2PKH script suffix, `OP_EQUALVERIFY OP_CHECKSIG`
pub const P2PKH_SUFFIX: [u8; 2] = [0x88, 0xac];

/// P2PKH script length
pub const P2PKH_SCRIPT_LEN: usize = P2PKH_PREFIX.len() + PUBKEY_HASH_LEN + P2PKH_SUFFIX.len();

/// Authority flag in output token data
pub const TOKEN_AUTHORITY_MASK: u8 = 0x80;

/// Token index mask in output token data
pub const TOKEN_INDEX_MASK: u8 = 0x7f;

/// Maximum signature length (DER encoded ECDSA)
pub const MAX_SIGNATURE_LEN: usize = 72;

/// Transaction signing stage, sent as P1 of [SignTxReq]
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum SignTxStage {
    /// Transaction data chunk
    Data = 0x00,
    /// Final transaction data chunk
    Sign = 0x01,
    /// Fetch signature following approval
    Done = 0x02,
}

/// Transaction signing request APDU
///
/// The stage is carried in P1, P2 carries the chunk index for [SignTxStage::Data]
/// and must be zero otherwise. The payload is a raw slice of the transaction stream.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignTxReq<'a> {
    pub stage: SignTxStage,
    pub chunk: u8,
    pub data: &'a [u8],
}

impl<'a> SignTxReq<'a> {
    /// Create a data chunk request
    pub fn data(chunk: u8, data: &'a [u8]) -> Self {
        Self {
            stage: SignTxStage::Data,
            chunk,
            data,
        }
    }

    /// Create the final chunk request
    pub fn sign(data: &'a [u8]) -> Self {
        Self {
            stage: SignTxStage::Sign,
            chunk: 0,
            data,
        }
    }

    /// Create a signature request
    pub fn done() -> Self {
        Self {
            stage: SignTxStage::Done,
            chunk: 0,
            data: &[],
        }
    }
}

impl<'a> ApduStatic for SignTxReq<'a> {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;
}

impl<'a> Encode for SignTxReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.data.len()].copy_from_slice(self.data);

        Ok(self.data.len())
    }
}

/// Transaction signature response APDU, raw signature bytes
#[derive(Clone, PartialEq, Debug)]
pub struct SignTxResp {
    pub signature: Vec<u8, MAX_SIGNATURE_LEN>,
}

impl Encode for SignTxResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.signature.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.signature.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.signature.len()].copy_from_slice(&self.signature);

        Ok(self.signature.len())
    }
}

impl DecodeOwned for SignTxResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        let signature = Vec::from_slice(buff).map_err(|_| ApduError::InvalidLength)?;
        Ok((Self { signature }, buff.len()))
    }
}

/// Change output information, identifies an output paying
/// back to a key derived by the device.
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | OUTPUT_INDEX  |                  PATH...                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct ChangeInfo {
    /// Index of the change output in the transaction
    pub index: u8,
    /// Derivation path of the change key
    pub path: Bip32Path,
}
