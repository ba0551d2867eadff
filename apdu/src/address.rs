// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address and extended public key APDUs

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, HTR_APDU_CLA};
use crate::{bip32::Bip32Path, helpers::arr};

/// Uncompressed secp256k1 public key length
pub const PUBLIC_KEY_LEN: usize = 65;

/// BIP32 chain code length
pub const CHAIN_CODE_LEN: usize = 32;

/// BIP32 parent fingerprint length
pub const FINGERPRINT_LEN: usize = 4;

/// Address confirmation request APDU
///
/// Displays the address for the provided path for operator confirmation,
/// responds with an empty payload once confirmed.
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct AddressReq {
    pub path: Bip32Path,
}

impl ApduStatic for AddressReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::GetAddress as u8;
}

/// Extended public key request APDU
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct XpubReq {
    pub path: Bip32Path,
}

impl ApduStatic for XpubReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::GetXpub as u8;
}

/// Extended public key response APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                 PUBLIC_KEY (65-byte uncompressed)             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     CHAIN_CODE (32-byte)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  PARENT_FINGERPRINT (4-byte)                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct XpubResp {
    #[encdec(with = "arr")]
    pub public_key: [u8; PUBLIC_KEY_LEN],
    #[encdec(with = "arr")]
    pub chain_code: [u8; CHAIN_CODE_LEN],
    #[encdec(with = "arr")]
    pub fingerprint: [u8; FINGERPRINT_LEN],
}
