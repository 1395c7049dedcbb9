// Copyright (c) 2023-2024 The Vaultgate Developers

//! Network metadata lookup interface.
//!
//! The coin table itself lives outside this crate (it is generated
//! alongside the wire definitions), the gate only consumes it as a
//! read-only lookup when resolving schema sets.

use crate::paths::HARDENED;

/// Coin descriptor returned by the metadata table
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CoinInfo {
    /// EIP-155 chain id, zero for non-chain-id coins
    pub chain_id: u64,
    /// slip44 coin id (unhardened)
    pub slip44: u32,
    /// Ticker shortcut for display
    pub shortcut: &'static str,
    /// Human readable network name
    pub name: &'static str,
}

impl CoinInfo {
    /// slip44 id with the hardened marker applied, as it appears in paths
    pub const fn slip44_hardened(&self) -> u32 {
        self.slip44 | HARDENED
    }
}

/// Read-only network metadata lookup
pub trait Networks {
    /// Look up a coin by its hardened slip44 id
    fn by_slip44_hardened(&self, slip44_hardened: u32) -> Option<&CoinInfo>;

    /// Look up a coin by EIP-155 chain id
    fn by_chain_id(&self, chain_id: u64) -> Option<&CoinInfo>;

    /// Special-case slip44 remap keyed by (chain id, transaction type)
    ///
    /// Networks sharing a chain id with a distinct derivation space
    /// (Wanchain-style) report the replacement id here.
    fn remap_slip44(&self, chain_id: u64, tx_type: Option<u64>) -> Option<u32> {
        let _ = (chain_id, tx_type);
        None
    }
}

/// Blanket impl to allow lookups through references
impl<T: Networks> Networks for &T {
    fn by_slip44_hardened(&self, slip44_hardened: u32) -> Option<&CoinInfo> {
        T::by_slip44_hardened(self, slip44_hardened)
    }

    fn by_chain_id(&self, chain_id: u64) -> Option<&CoinInfo> {
        T::by_chain_id(self, chain_id)
    }

    fn remap_slip44(&self, chain_id: u64, tx_type: Option<u64>) -> Option<u32> {
        T::remap_slip44(self, chain_id, tx_type)
    }
}

/// Static slice-backed table, the usual [`Networks`] implementation
impl Networks for &'static [CoinInfo] {
    fn by_slip44_hardened(&self, slip44_hardened: u32) -> Option<&CoinInfo> {
        self.iter().find(|c| c.slip44_hardened() == slip44_hardened)
    }

    fn by_chain_id(&self, chain_id: u64) -> Option<&CoinInfo> {
        self.iter().find(|c| c.chain_id == chain_id)
    }
}
