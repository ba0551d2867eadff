// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Hathor hardware wallet core
//!
//! This provides a common [Engine][engine] supporting transaction confirmation and signing,
//! and token metadata authentication, for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [ledger_htr_apdu] for APDU objects and wire encodings. Requests requiring operator
//! confirmation return [Output::Pending][engine::Output::Pending], the rendered
//! [Prompt][engine::Prompt] is available via [Engine::prompt][engine::Engine::prompt]
//! and the operator decision is applied with [Engine::decide][engine::Engine::decide].
//!
//! ## Operations
//!
//! Clients may issue a [`VersionReq`][ledger_htr_apdu::version::VersionReq] to fetch
//! the application version.
//!
//! ### Addresses and public keys
//!
//! Addresses are displayed for confirmation via [`AddressReq`][ledger_htr_apdu::address::AddressReq],
//! extended public keys are exported on approval of an [`XpubReq`][ledger_htr_apdu::address::XpubReq].
//!
//! ### Token metadata
//!
//! Custom tokens are referenced in transaction outputs by uid, to display outputs the device
//! must know the symbol bound to each uid. Rather than confirming token metadata for every
//! transaction, the device signs metadata once using a device-local secret and trusts
//! signed metadata declared prior to a transaction.
//!
//! 1. Issue [`SignTokenDataReq`][ledger_htr_apdu::token::SignTokenDataReq] to display token
//!    metadata and fetch a [`TokenSigResp`][ledger_htr_apdu::token::TokenSigResp] on approval
//! 2. Issue [`SendTokenDataReq`][ledger_htr_apdu::token::SendTokenDataReq] for each token
//!    referenced by a transaction, the first request in a sequence clears prior declarations.
//!    Declarations while a transaction is in progress abandon the transaction
//! 3. [`VerifyTokenSigReq`][ledger_htr_apdu::token::VerifyTokenSigReq] checks a signature
//!    without declaring the token
//! 4. [`ResetTokenSigsReq`][ledger_htr_apdu::token::ResetTokenSigsReq] rotates the secret
//!    on approval, invalidating every issued signature
//!
//! ### Executing a transaction
//!
//! Transactions are streamed to the device as a change preamble followed by the serialised
//! transaction, using [`SignTxReq`][ledger_htr_apdu::tx::SignTxReq] with the stage in P1.
//!
//! 1. Issue [`SignTxStage::Data`][ledger_htr_apdu::tx::SignTxStage::Data] chunks with
//!    sequential chunk indices from zero
//! 2. Issue the final chunk with [`SignTxStage::Sign`][ledger_htr_apdu::tx::SignTxStage::Sign]
//! 3. Outputs are displayed for approval as they are decoded, change outputs paying back
//!    to the device are skipped, followed by a final confirmation once every output is approved
//! 4. Issue [`SignTxStage::Done`][ledger_htr_apdu::tx::SignTxStage::Done] to fetch the
//!    signature over the transaction sighash
//!
//! Any rejection or protocol violation wipes the transaction and declared tokens.
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_htr_apdu::{self as apdu};

pub mod engine;

pub mod helpers;
