// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Engine configuration

use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use ledger_htr_apdu::bip32::Bip32Path;

/// Mainnet address version byte, addresses start with `H`
pub const MAINNET_VERSION: u8 = 0x28;

/// Testnet address version byte, addresses start with `W`
pub const TESTNET_VERSION: u8 = 0x49;

/// Network used for address rendering
#[derive(Copy, Clone, PartialEq, Debug, Default, EnumString, Display, EnumVariantNames, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Address version byte for the network
    pub const fn version(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_VERSION,
            Network::Testnet => TESTNET_VERSION,
        }
    }
}

/// [Engine][super::Engine] configuration
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Network for displayed addresses
    pub network: Network,
    /// Path used to sign approved transactions
    pub account_path: Bip32Path,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            account_path: Bip32Path::default_account(),
        }
    }
}
