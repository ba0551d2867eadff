// Copyright (c) 2022-2023 The MobileCoin Foundation

//! APDU status words returned by the Hathor app
//!

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

/// Status word appended to every response APDU
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u16)]
pub enum StatusWord {
    /// Success
    Ok = 0x9000,
    /// Rejected by the operator
    Deny = 0x6985,
    /// Invalid P1 or P2 for the instruction
    WrongP1P2 = 0x6a86,
    /// Payload missing, unexpected or over length
    WrongDataLength = 0x6a87,
    /// Unknown instruction
    InsNotSupported = 0x6d00,
    /// Unknown class
    ClaNotSupported = 0x6e00,
    /// Response does not fit the APDU buffer
    WrongResponseLength = 0xb000,
    /// Transaction or token record failed to parse
    TxParsingFail = 0xb005,
    /// Request not valid in the current state
    BadState = 0xb007,
    /// Signing provider failure
    SignatureFail = 0xb008,
    /// Token signature mismatch
    InvalidSignature = 0xb009,
    /// Persistent storage failure
    StorageFail = 0xb00a,
}

impl StatusWord {
    /// Encode status word as trailing response bytes
    pub fn to_bytes(&self) -> [u8; 2] {
        (*self as u16).to_be_bytes()
    }
}

impl From<StatusWord> for u16 {
    fn from(sw: StatusWord) -> Self {
        sw as u16
    }
}
