// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use ledger_htr_apdu::{
    address::XpubResp,
    token::{TokenSig, TokenSigResp},
    tx::SignTxResp,
    version::VersionResp,
    ApduError,
};

use super::Signature;

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Request complete, empty response
    None,

    /// Awaiting an operator decision, the response is deferred
    /// until [`Engine::decide`][super::Engine::decide] is called
    Pending,

    /// Application version
    Version(VersionResp),

    /// Extended public key
    Xpub(XpubResp),

    /// Token metadata signature
    TokenSignature(TokenSig),

    /// Transaction signature
    TxSignature(Signature),
}

impl Output {
    /// Check whether the output awaits an operator decision
    pub fn is_pending(&self) -> bool {
        matches!(self, Output::Pending)
    }

    /// Encode an [`Output`] object to a response [APDU][crate::apdu]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None | Output::Pending => Ok(0),
            Output::Version(v) => v.encode(buff),
            Output::Xpub(x) => x.encode(buff),
            Output::TokenSignature(s) => TokenSigResp { signature: *s }.encode(buff),
            Output::TxSignature(s) => SignTxResp {
                signature: s.clone(),
            }
            .encode(buff),
        }
    }
}
