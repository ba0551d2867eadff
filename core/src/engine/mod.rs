// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides functionality required by hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.
//!
//! Requests requiring operator confirmation return [Output::Pending] and
//! expose a [Prompt] via [Engine::prompt], the operator decision is applied
//! with [Engine::decide] which returns the deferred response.

use heapless::Vec;
use rand_core::{CryptoRngCore, OsRng};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use ledger_htr_apdu::{
    address::XpubResp,
    tx::{SignTxStage, MAX_SIGNATURE_LEN, PUBKEY_HASH_LEN},
    version::VersionResp,
};

mod config;
pub use config::{Config, Network, MAINNET_VERSION, TESTNET_VERSION};

mod error;
pub use error::Error;

mod event;
pub use event::Event;

mod function;
pub use function::Function;

mod output;
pub use output::Output;

mod prompt;
pub use prompt::{Prompt, AUTHORITY_LABEL, MAX_AMOUNT_LEN, MAX_LABEL_LEN};

mod secret;
pub use secret::{Secret, SecretStore, Storage, SECRET_LEN};

pub mod token;
pub use token::{TokenRegistry, TX_MAX_TOKENS};

mod tx;
pub use tx::{TxSession, TxState, Walk, MAX_BUFFER_LEN, MAX_CHANGE_OUTPUTS, MAX_OUTPUTS};

mod txout;
pub use txout::{DecodeError, TokenRef, TxOutput};

/// Transaction signature, DER encoded
pub type Signature = Vec<u8, MAX_SIGNATURE_LEN>;

/// Application version reported via [Event::GetVersion]
pub const APP_VERSION: VersionResp = VersionResp {
    major: parse_version(env!("CARGO_PKG_VERSION_MAJOR")),
    minor: parse_version(env!("CARGO_PKG_VERSION_MINOR")),
    patch: parse_version(env!("CARGO_PKG_VERSION_PATCH")),
};

const fn parse_version(s: &str) -> u8 {
    let b = s.as_bytes();
    let mut v = 0u8;
    let mut i = 0;
    while i < b.len() {
        v = v * 10 + (b[i] - b'0');
        i += 1;
    }
    v
}

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no request in progress
    Init,

    /// Receiving transaction data
    TxReceiving,

    /// Transaction approved, awaiting signature request
    TxApproved,

    /// Awaiting an operator decision
    Pending(Pending),
}

/// Kinds of request awaiting an operator decision
#[derive(Copy, Clone, PartialEq, Debug, Default, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum Pending {
    #[default]
    Address,
    Xpub,
    TokenData,
    ResetTokenSignatures,
    TxOutput,
    TxConfirm,
}

/// [Engine] provides hardware-independent support for Hathor wallet operations
pub struct Engine<DRV: Driver, NVM: Storage, RNG: CryptoRngCore = OsRng> {
    state: State,
    config: Config,

    function: Function,
    prompt: Option<Prompt>,

    registry: TokenRegistry,
    secrets: SecretStore<NVM, RNG>,

    drv: DRV,
}

/// [`Driver`] trait provides platform key derivation and signing for [`Engine`] instances
pub trait Driver {
    /// Derive the public key hash (HASH160 of the compressed public key) for a path
    fn pubkey_hash(&self, path: &[u32]) -> Result<[u8; PUBKEY_HASH_LEN], Error>;

    /// Derive the extended public key for a path
    fn xpub(&self, path: &[u32]) -> Result<XpubResp, Error>;

    /// Sign a digest with the key for a path
    fn sign(&self, path: &[u32], digest: &[u8; 32]) -> Result<Signature, Error>;
}

impl<T: Driver> Driver for &mut T {
    fn pubkey_hash(&self, path: &[u32]) -> Result<[u8; PUBKEY_HASH_LEN], Error> {
        T::pubkey_hash(self, path)
    }

    fn xpub(&self, path: &[u32]) -> Result<XpubResp, Error> {
        T::xpub(self, path)
    }

    fn sign(&self, path: &[u32], digest: &[u8; 32]) -> Result<Signature, Error> {
        T::sign(self, path, digest)
    }
}

impl<DRV: Driver, NVM: Storage> Engine<DRV, NVM> {
    /// Create a new engine instance with the provided driver and secret storage,
    /// using the default [OsRng]
    pub fn new(drv: DRV, nvm: NVM) -> Self {
        Self::new_with_rng(drv, nvm, OsRng {})
    }
}

impl<DRV: Driver, NVM: Storage, RNG: CryptoRngCore> Engine<DRV, NVM, RNG> {
    /// Create a new engine instance with the provided driver, secret storage and rng
    pub fn new_with_rng(drv: DRV, nvm: NVM, rng: RNG) -> Self {
        Self {
            state: State::Init,
            config: Config::default(),
            function: Function::new(),
            prompt: None,
            registry: TokenRegistry::new(),
            secrets: SecretStore::new(nvm, rng),
            drv,
        }
    }

    /// Set engine configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Fetch engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch the prompt awaiting an operator decision
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Fetch tokens declared for the current transaction
    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Fetch the transaction in progress
    pub fn tx(&self) -> Option<&TxSession> {
        self.function.tx_ref()
    }

    /// Access the secret storage
    pub fn storage(&self) -> &NVM {
        self.secrets.storage()
    }

    /// Handle incoming events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        // Requests are not accepted while awaiting the operator
        if let State::Pending(_p) = self.state {
            if !matches!(evt, Event::None | Event::GetVersion) {
                #[cfg(feature = "log")]
                log::warn!("unexpected event awaiting {} decision", _p);

                self.wipe();
                return Err(Error::UnexpectedEvent);
            }
        }

        match evt {
            Event::None => Ok(Output::None),

            Event::GetVersion => Ok(Output::Version(APP_VERSION)),

            Event::GetAddress { path } => {
                self.clear();

                let pubkey_hash = self.drv.pubkey_hash(path.as_slice())?;
                let prompt = Prompt::address(self.config.network, path, &pubkey_hash)?;

                self.function.public_key_init(path);
                Ok(self.await_decision(Pending::Address, prompt))
            }

            Event::GetXpub { path } => {
                self.clear();

                self.function.public_key_init(path);
                Ok(self.await_decision(Pending::Xpub, Prompt::Xpub { path: path.clone() }))
            }

            Event::SignTokenData(token) => {
                self.clear();

                let prompt = Prompt::token_data(token)?;

                self.function.token_data_init(token);
                Ok(self.await_decision(Pending::TokenData, prompt))
            }

            Event::SendTokenData { first, data } => {
                // Tokens may not change under a transaction in progress
                if matches!(self.state, State::TxReceiving | State::TxApproved) {
                    #[cfg(feature = "log")]
                    log::warn!("token declaration during transaction");

                    self.wipe();
                    return Err(Error::UnexpectedEvent);
                }

                if *first {
                    self.wipe();
                }

                self.registry.declare(data, &mut self.secrets)?;

                Ok(Output::None)
            }

            Event::VerifyTokenSignature(data) => {
                self.clear();

                token::verify_from_wire(data, &mut self.secrets)?;

                Ok(Output::None)
            }

            Event::ResetTokenSignatures => {
                self.clear();

                Ok(self.await_decision(Pending::ResetTokenSignatures, Prompt::ResetTokenSignatures))
            }

            Event::SignTx { stage, chunk, data } => self.sign_tx(*stage, *chunk, data),
        }
    }

    /// Apply an operator decision to the pending request,
    /// returning the deferred response
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn decide(&mut self, approve: bool) -> Result<Output, Error> {
        let pending = match self.state {
            State::Pending(p) => p,
            _ => return Err(Error::BadState),
        };
        self.prompt = None;

        if !approve {
            #[cfg(feature = "log")]
            log::info!("{} denied", pending);

            match pending {
                Pending::TxOutput | Pending::TxConfirm => self.wipe(),
                _ => self.clear(),
            }
            return Err(Error::Denied);
        }

        #[cfg(feature = "log")]
        log::info!("{} approved", pending);

        let r = match pending {
            Pending::Address => match self.function.public_key() {
                Some(_) => Ok(Output::None),
                None => Err(Error::BadState),
            },
            Pending::Xpub => match self.function.public_key() {
                Some(p) => self.drv.xpub(p.as_slice()).map(Output::Xpub),
                None => Err(Error::BadState),
            },
            Pending::TokenData => match self.function.token_data() {
                Some(t) => self
                    .secrets
                    .read()
                    .map(|s| Output::TokenSignature(token::sign(&s, t))),
                None => Err(Error::BadState),
            },
            Pending::ResetTokenSignatures => self.secrets.rotate().map(|_| Output::None),
            Pending::TxOutput => return self.tx_approve_output(),
            Pending::TxConfirm => return self.tx_approve(),
        };

        self.clear();

        r
    }

    /// Abandon any request in progress and forget declared tokens
    pub fn reset(&mut self) {
        self.wipe();
    }

    /// Handle transaction chunks and signature requests
    fn sign_tx(&mut self, stage: SignTxStage, chunk: u8, data: &[u8]) -> Result<Output, Error> {
        match (self.state, stage) {
            // Transactions fitting a single chunk may start with the final chunk
            (State::Init, SignTxStage::Data | SignTxStage::Sign) if chunk == 0 => {
                #[cfg(feature = "log")]
                log::debug!("starting transaction");

                self.function.tx_init();
                self.state = State::TxReceiving;
            }
            (State::TxReceiving, SignTxStage::Data | SignTxStage::Sign) => (),
            (State::TxApproved, SignTxStage::Done) => return self.tx_complete(),
            _ => {
                #[cfg(feature = "log")]
                log::warn!("unexpected {} chunk {} in state {}", stage, chunk, self.state);

                self.wipe();
                return Err(Error::BadState);
            }
        }

        let r = self.tx_receive(stage, chunk, data);
        if r.is_err() {
            self.wipe();
        }

        r
    }

    fn tx_receive(&mut self, stage: SignTxStage, chunk: u8, data: &[u8]) -> Result<Output, Error> {
        let tx = self.function.tx().ok_or(Error::BadState)?;

        tx.receive(stage, chunk, data)?;
        tx.process(&self.registry, &self.drv)?;

        self.tx_walk()
    }

    /// Walk buffered outputs, prompting for the next output or final approval
    fn tx_walk(&mut self) -> Result<Output, Error> {
        let tx = self.function.tx().ok_or(Error::BadState)?;

        match tx.walk(&self.registry, &self.drv)? {
            Walk::NeedData => {
                self.state = State::TxReceiving;
                Ok(Output::None)
            }
            Walk::Confirm(out) => {
                let prompt = Prompt::tx_output(self.config.network, tx, &out, &self.registry)?;
                Ok(self.await_decision(Pending::TxOutput, prompt))
            }
            Walk::Parsed => {
                #[cfg(feature = "log")]
                log::info!("transaction parsed, awaiting approval");

                Ok(self.await_decision(Pending::TxConfirm, Prompt::TxConfirm))
            }
        }
    }

    fn tx_approve_output(&mut self) -> Result<Output, Error> {
        let r = match self.function.tx() {
            Some(tx) => tx.approve_output(),
            None => Err(Error::BadState),
        };
        let r = r.and_then(|_| self.tx_walk());

        if r.is_err() {
            self.wipe();
        }

        r
    }

    fn tx_approve(&mut self) -> Result<Output, Error> {
        let r = match self.function.tx() {
            Some(tx) => tx.approve(),
            None => Err(Error::BadState),
        };

        match r {
            Ok(_) => {
                self.state = State::TxApproved;
                Ok(Output::None)
            }
            Err(e) => {
                self.wipe();
                Err(e)
            }
        }
    }

    /// Sign the approved transaction, the session is wiped regardless of outcome
    fn tx_complete(&mut self) -> Result<Output, Error> {
        let r = match self.function.tx_ref().and_then(|tx| tx.sighash()) {
            Some(digest) => self
                .drv
                .sign(self.config.account_path.as_slice(), &digest),
            None => Err(Error::BadState),
        };

        #[cfg(feature = "log")]
        log::info!("transaction complete (ok: {})", r.is_ok());

        self.wipe();

        r.map(Output::TxSignature)
    }

    fn await_decision(&mut self, pending: Pending, prompt: Prompt) -> Output {
        self.prompt = Some(prompt);
        self.state = State::Pending(pending);

        Output::Pending
    }

    /// Clear the request context
    fn clear(&mut self) {
        self.function.clear();
        self.prompt = None;
        self.state = State::Init;
    }

    /// Clear the request context and declared tokens
    fn wipe(&mut self) {
        self.clear();
        self.registry.reset();
    }
}
