// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Token metadata APDUs
//!
//! Custom tokens are identified by a 32-byte uid, metadata (symbol and name) is
//! bound to the uid by a device-issued signature so it can be displayed during
//! transaction review without being confirmed again by the operator.

use encdec::{Decode, DecodeOwned, Encode};
use heapless::Vec;

use super::{ApduError, ApduStatic, Instruction, HTR_APDU_CLA};
use crate::helpers::{arr, short_bytes};

/// Token uid length
pub const TOKEN_UID_LEN: usize = 32;

/// Maximum token symbol length
pub const MAX_TOKEN_SYMBOL_LEN: usize = 5;

/// Maximum token name length
pub const MAX_TOKEN_NAME_LEN: usize = 30;

/// Token signature (tag) length
pub const TOKEN_SIG_LEN: usize = 32;

/// Token uid
pub type TokenUid = [u8; TOKEN_UID_LEN];

/// Token signature issued by the device
pub type TokenSig = [u8; TOKEN_SIG_LEN];

/// Check a symbol or name contains only printable ASCII.
///
/// A NUL byte terminates the string, bytes following the first NUL are not checked.
pub fn is_printable(s: &[u8]) -> bool {
    for c in s {
        if *c == 0x00 {
            return true;
        }
        if *c < 0x20 || *c > 0x7f {
            return false;
        }
    }
    true
}

/// Token metadata record
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    VERSION    |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                      TOKEN_UID (32-byte)                      /
/// +               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |  SYMBOL_LEN   |         SYMBOL (<= 5)         /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   NAME_LEN    |                 NAME (<= 30)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenData {
    /// Token metadata version
    pub version: u8,
    /// Token uid
    pub uid: TokenUid,
    /// Token symbol (printable ASCII)
    pub symbol: Vec<u8, MAX_TOKEN_SYMBOL_LEN>,
    /// Token name (printable ASCII)
    pub name: Vec<u8, MAX_TOKEN_NAME_LEN>,
}

impl TokenData {
    /// Create a new token record, checking field lengths and contents
    pub fn new(version: u8, uid: TokenUid, symbol: &[u8], name: &[u8]) -> Result<Self, ApduError> {
        if !is_printable(symbol) || !is_printable(name) {
            return Err(ApduError::InvalidEncoding);
        }

        Ok(Self {
            version,
            uid,
            symbol: Vec::from_slice(symbol).map_err(|_| ApduError::InvalidLength)?,
            name: Vec::from_slice(name).map_err(|_| ApduError::InvalidLength)?,
        })
    }

    /// Symbol for display, up to the first NUL
    pub fn symbol_str(&self) -> &str {
        display_str(&self.symbol)
    }

    /// Name for display, up to the first NUL
    pub fn name_str(&self) -> &str {
        display_str(&self.name)
    }
}

/// Fetch the displayable (NUL-terminated) prefix of a printable field
fn display_str(s: &[u8]) -> &str {
    let n = s.iter().position(|c| *c == 0).unwrap_or(s.len());
    // Printable ASCII prefix is always valid UTF-8
    core::str::from_utf8(&s[..n]).unwrap_or("")
}

impl Encode for TokenData {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1 + TOKEN_UID_LEN + 1 + self.symbol.len() + 1 + self.name.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[index] = self.version;
        index += 1;

        index += arr::enc(&self.uid, &mut buff[index..])?;
        index += short_bytes::enc(&self.symbol, &mut buff[index..])?;
        index += short_bytes::enc(&self.name, &mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for TokenData {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        let version = buff[index];
        index += 1;

        let (uid, n) = arr::dec::<TOKEN_UID_LEN>(&buff[index..])?;
        index += n;

        let (symbol, n) = short_bytes::dec(&buff[index..], MAX_TOKEN_SYMBOL_LEN)?;
        index += n;

        let (name, n) = short_bytes::dec(&buff[index..], MAX_TOKEN_NAME_LEN)?;
        index += n;

        Ok((Self::new(version, uid, symbol, name)?, index))
    }
}

/// Sign token data request APDU, displays the token for approval
/// and returns a [TokenSigResp] on success.
///
/// Encoded as a bare [TokenData] record.
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignTokenDataReq {
    pub token: TokenData,
}

impl ApduStatic for SignTokenDataReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::SignTokenData as u8;
}

/// Token signature response APDU
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TokenSigResp {
    #[encdec(with = "arr")]
    pub signature: TokenSig,
}

/// Signed token record, used to declare tokens prior to a transaction
/// ([SendTokenDataReq]) or to check a signature ([VerifyTokenSigReq]).
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                      TOKEN_DATA (variable)                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                      SIGNATURE (32-byte)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignedTokenData {
    pub token: TokenData,
    #[encdec(with = "arr")]
    pub signature: TokenSig,
}

/// Declare a signed token, `P1 = 0` for the first token in a sequence
#[derive(Clone, PartialEq, Debug)]
pub struct SendTokenDataReq {
    /// Start a new declaration sequence (clears previously declared tokens)
    pub first: bool,
    pub data: SignedTokenData,
}

impl ApduStatic for SendTokenDataReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::SendTokenData as u8;
}

impl SendTokenDataReq {
    /// P1 value for this request
    pub fn sequence(&self) -> u8 {
        match self.first {
            true => 0,
            false => 1,
        }
    }
}

impl Encode for SendTokenDataReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        self.data.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        self.data.encode(buff)
    }
}

/// Verify a signed token record
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct VerifyTokenSigReq {
    pub data: SignedTokenData,
}

impl ApduStatic for VerifyTokenSigReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::VerifyTokenSignature as u8;
}

/// Rotate the token signing secret, invalidating all issued signatures
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ResetTokenSigsReq;

impl ApduStatic for ResetTokenSigsReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::ResetTokenSignatures as u8;
}

impl Encode for ResetTokenSigsReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}
