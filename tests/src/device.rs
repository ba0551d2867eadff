// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device abstraction for test flows

use ledger_htr_apdu::prelude::StatusWord;

/// Device errors, carrying the status word returned for a request
#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed with status {0}")]
    Status(StatusWord),

    #[error("unknown status word {0:04x}")]
    UnknownStatus(u16),

    #[error("no operator decision pending")]
    NotPending,
}

impl Error {
    /// Build an error from a raw status word
    pub fn from_status(sw: u16) -> Self {
        match StatusWord::try_from(sw) {
            Ok(s) => Error::Status(s),
            Err(_) => Error::UnknownStatus(sw),
        }
    }

    /// Fetch the status word for this error
    pub fn status(&self) -> Option<StatusWord> {
        match self {
            Error::Status(s) => Some(*s),
            _ => None,
        }
    }
}

/// Response to a request or operator decision
#[derive(Clone, PartialEq, Debug)]
pub enum Response {
    /// Response payload
    Data(Vec<u8>),
    /// Awaiting an operator decision
    Pending,
}

impl Response {
    /// Fetch the response payload, failing if a decision is pending
    pub fn data(self) -> Result<Vec<u8>, Error> {
        match self {
            Response::Data(d) => Ok(d),
            Response::Pending => Err(Error::Status(StatusWord::BadState)),
        }
    }
}

/// Device interface used by test flows
pub trait Device {
    /// Exchange a request APDU
    fn exchange(&mut self, ins: u8, p1: u8, p2: u8, data: &[u8]) -> Result<Response, Error>;

    /// Fetch the text currently displayed for operator confirmation
    fn screen(&self) -> Option<Vec<String>>;

    /// Apply an operator decision to the displayed prompt
    fn decide(&mut self, approve: bool) -> Result<Response, Error>;
}

impl<T: Device> Device for &mut T {
    fn exchange(&mut self, ins: u8, p1: u8, p2: u8, data: &[u8]) -> Result<Response, Error> {
        T::exchange(self, ins, p1, p2, data)
    }

    fn screen(&self) -> Option<Vec<String>> {
        T::screen(self)
    }

    fn decide(&mut self, approve: bool) -> Result<Response, Error> {
        T::decide(self, approve)
    }
}
