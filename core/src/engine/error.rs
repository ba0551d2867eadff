// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_htr_apdu::{status::StatusWord, ApduError};

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x01,

    /// Too many declared tokens
    #[cfg_attr(feature = "thiserror", error("Token capacity exceeded"))]
    CapacityExceeded = 0x02,

    /// Token signature mismatch or malformed signed token
    #[cfg_attr(feature = "thiserror", error("Invalid token signature"))]
    InvalidSignature = 0x03,

    /// Malformed transaction or token data
    #[cfg_attr(feature = "thiserror", error("Invalid data"))]
    InvalidData = 0x04,

    /// Output references a token missing from the transaction token table
    #[cfg_attr(feature = "thiserror", error("Unknown token index"))]
    UnknownToken = 0x05,

    /// Change output does not match the derived change key
    #[cfg_attr(feature = "thiserror", error("Invalid change output"))]
    InvalidChange = 0x06,

    /// Invalid engine state for request
    #[cfg_attr(feature = "thiserror", error("Invalid engine state"))]
    BadState = 0x07,

    /// Request denied by the operator
    #[cfg_attr(feature = "thiserror", error("Denied by operator"))]
    Denied = 0x08,

    /// Invalid P1 / P2 for the instruction
    #[cfg_attr(feature = "thiserror", error("Invalid P1 / P2"))]
    WrongP1P2 = 0x09,

    /// Unsupported instruction
    #[cfg_attr(feature = "thiserror", error("Unsupported instruction"))]
    InsNotSupported = 0x0a,

    /// Signing provider failure
    #[cfg_attr(feature = "thiserror", error("Signing failed"))]
    SignFailed = 0x0b,

    /// Key derivation failure
    #[cfg_attr(feature = "thiserror", error("Key derivation failed"))]
    DeriveFailed = 0x0c,

    /// Secret storage failure
    #[cfg_attr(feature = "thiserror", error("Secret storage failed"))]
    StorageFailed = 0x0d,

    /// Response encoding failed
    #[cfg_attr(feature = "thiserror", error("Response encoding failed"))]
    EncodingFailed = 0x0e,

    /// Unsupported APDU class
    #[cfg_attr(feature = "thiserror", error("Unsupported class"))]
    ClaNotSupported = 0x0f,
}

impl Error {
    /// Map an engine error to the status word returned to the host
    pub fn status(&self) -> StatusWord {
        match self {
            Error::InvalidLength | Error::CapacityExceeded => StatusWord::WrongDataLength,
            Error::UnexpectedEvent | Error::BadState => StatusWord::BadState,
            Error::InvalidSignature => StatusWord::InvalidSignature,
            Error::InvalidData | Error::UnknownToken | Error::InvalidChange => {
                StatusWord::TxParsingFail
            }
            Error::Denied => StatusWord::Deny,
            Error::WrongP1P2 => StatusWord::WrongP1P2,
            Error::InsNotSupported => StatusWord::InsNotSupported,
            Error::SignFailed | Error::DeriveFailed => StatusWord::SignatureFail,
            Error::StorageFailed => StatusWord::StorageFail,
            Error::EncodingFailed => StatusWord::WrongResponseLength,
            Error::ClaNotSupported => StatusWord::ClaNotSupported,
        }
    }
}

/// Request decoding errors, length errors are reported as such
/// and any other malformed request as invalid data
impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        match e {
            ApduError::InvalidLength => Error::InvalidLength,
            _ => Error::InvalidData,
        }
    }
}

impl From<Error> for StatusWord {
    fn from(e: Error) -> Self {
        e.status()
    }
}
