// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Hathor app communication
//!
//! This module provides a protocol specification and reference implementation for communication
//! with Hathor hardware wallets.
//!
//! APDUs use the primitive binary encoding of the Hathor client library, fields are packed
//! without padding and all multi-byte integers are big-endian to match the network's own
//! transaction serialisation.
//!
//! Requests that carry a token record ([`token::TokenData`]) share a single encoding, so the
//! same parser is used when declaring, verifying and displaying token metadata.
//!

#![no_std]

use core::fmt::Debug;

pub use ledger_proto::{ApduError, ApduStatic};

pub mod address;
pub mod bip32;
pub mod prelude;
pub mod status;
pub mod token;
pub mod tx;
pub mod version;

mod helpers;

/// Hathor APDU Class
pub const HTR_APDU_CLA: u8 = 0xe0;

/// Hathor APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x03,

    /// Confirm an address on the device
    GetAddress = 0x04,

    /// Fetch an extended public key
    GetXpub = 0x05,

    /// Stream a transaction for signing
    SignTx = 0x06,

    /// Display token metadata and issue a signature
    SignTokenData = 0x07,

    /// Declare signed token metadata for an upcoming transaction
    SendTokenData = 0x08,

    /// Check a token signature
    VerifyTokenSignature = 0x09,

    /// Rotate the token signing secret
    ResetTokenSignatures = 0x0a,
}
