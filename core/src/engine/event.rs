// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;

use ledger_htr_apdu::{prelude::*, ApduError};

use super::Error;

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, Debug)]
pub enum Event<'a> {
    None,

    /// Fetch application version
    GetVersion,

    /// Confirm the address for a derivation path
    GetAddress { path: Bip32Path },

    /// Fetch the extended public key for a derivation path
    GetXpub { path: Bip32Path },

    /// Transaction chunk or signature request
    SignTx {
        stage: SignTxStage,
        chunk: u8,
        data: &'a [u8],
    },

    /// Display token metadata and issue a signature on approval
    SignTokenData(TokenData),

    /// Declare a signed token record, `first` starts a new declaration sequence
    SendTokenData { first: bool, data: &'a [u8] },

    /// Check a signed token record
    VerifyTokenSignature(&'a [u8]),

    /// Rotate the token signing secret
    ResetTokenSignatures,
}

/// Helper for decoding APDUs to events, requests must consume the entire payload
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event<'a>, Error>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    let (v, n) = T::decode(buff)?;
    if n != buff.len() {
        return Err(Error::InvalidLength);
    }

    Ok(Event::from(v))
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event, checking the class byte
    pub fn parse_apdu(cla: u8, ins: u8, p1: u8, p2: u8, buff: &'a [u8]) -> Result<Self, Error> {
        if cla != HTR_APDU_CLA {
            return Err(Error::ClaNotSupported);
        }

        Self::parse(ins, p1, p2, buff)
    }

    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, p1: u8, p2: u8, buff: &'a [u8]) -> Result<Self, Error> {
        let ins = Instruction::try_from(ins).map_err(|_| Error::InsNotSupported)?;

        // Only transaction and token declaration requests use P1 / P2
        match ins {
            Instruction::SignTx => (),
            Instruction::SendTokenData if p2 == 0 => (),
            _ if p1 == 0 && p2 == 0 => (),
            _ => return Err(Error::WrongP1P2),
        }

        match ins {
            Instruction::GetVersion => Ok(Event::GetVersion),
            Instruction::GetAddress => decode_event::<AddressReq>(buff),
            Instruction::GetXpub => decode_event::<XpubReq>(buff),
            Instruction::SignTx => Self::parse_sign_tx(p1, p2, buff),
            Instruction::SignTokenData => decode_event::<SignTokenDataReq>(buff),
            Instruction::SendTokenData => Ok(Event::SendTokenData {
                first: p1 == 0,
                data: buff,
            }),
            Instruction::VerifyTokenSignature => Ok(Event::VerifyTokenSignature(buff)),
            Instruction::ResetTokenSignatures => Ok(Event::ResetTokenSignatures),
        }
    }

    /// Data and final chunks must carry data, signature requests must not
    fn parse_sign_tx(p1: u8, p2: u8, buff: &'a [u8]) -> Result<Self, Error> {
        let stage = SignTxStage::try_from(p1).map_err(|_| Error::WrongP1P2)?;

        match (stage, p2, buff.is_empty()) {
            (SignTxStage::Sign | SignTxStage::Done, 1.., _) => Err(Error::WrongP1P2),
            (SignTxStage::Data | SignTxStage::Sign, _, true) => Err(Error::InvalidLength),
            (SignTxStage::Done, _, false) => Err(Error::InvalidLength),
            _ => Ok(Event::SignTx {
                stage,
                chunk: p2,
                data: buff,
            }),
        }
    }
}

impl<'a> From<AddressReq> for Event<'a> {
    fn from(a: AddressReq) -> Self {
        Event::GetAddress { path: a.path }
    }
}

impl<'a> From<XpubReq> for Event<'a> {
    fn from(a: XpubReq) -> Self {
        Event::GetXpub { path: a.path }
    }
}

impl<'a> From<SignTokenDataReq> for Event<'a> {
    fn from(a: SignTokenDataReq) -> Self {
        Event::SignTokenData(a.token)
    }
}

impl<'a> From<SignTxReq<'a>> for Event<'a> {
    fn from(a: SignTxReq<'a>) -> Self {
        Event::SignTx {
            stage: a.stage,
            chunk: a.chunk,
            data: a.data,
        }
    }
}
