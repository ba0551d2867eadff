//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    address::{AddressReq, XpubReq, XpubResp},
    bip32::Bip32Path,
    status::StatusWord,
    token::{
        ResetTokenSigsReq, SendTokenDataReq, SignTokenDataReq, SignedTokenData, TokenData,
        TokenSigResp, VerifyTokenSigReq,
    },
    tx::{ChangeInfo, SignTxReq, SignTxResp, SignTxStage},
    version::{VersionReq, VersionResp},
    Instruction, HTR_APDU_CLA,
};
