// Copyright (c) 2023-2024 The Vaultgate Developers

//! Hardware wallet access-control and user-confirmation gate
//!
//! Every protocol handler that touches private key material is wrapped
//! twice before its effectful body runs: first by derivation-path
//! access resolution, then by user confirmation.
//!
//! ## Path access
//!
//! A request resolves to a [`SchemaSet`][paths::SchemaSet], either
//! from its embedded path
//! ([`schemas_from_path`][keychain::schemas_from_path]) or from an
//! explicit chain id
//! ([`schemas_from_chain_id`][keychain::schemas_from_chain_id]) via
//! the external [`Networks`][networks::Networks] metadata table. A
//! [`Keychain`][keychain::Keychain] is then
//! [`acquire`][keychain::acquire]d for the set, failing closed with
//! [`Error::AccessDenied`] when the set is empty, and key derivation
//! through the keychain refuses any path outside the set. Handlers are
//! composed with
//! [`with_keychain_from_path`][keychain::with_keychain_from_path] /
//! [`with_keychain_from_chain_id`][keychain::with_keychain_from_chain_id],
//! which scope the keychain around the handler body and clear seed
//! material on every exit path.
//!
//! ## Confirmation
//!
//! [`confirm::require_confirm`], [`confirm::require_hold_to_confirm`]
//! and [`confirm::require_interact`] transmit a
//! [`ButtonRequestCode`][confirm::ButtonRequestCode] to the peer,
//! present a [`Dialog`][confirm::Dialog] through the platform
//! [`Driver`], and convert a declined decision into
//! [`Error::ActionCancelled`], unwinding the request before any side
//! effect occurs.
//!
//! Wire decoding, transaction construction, dialog rendering and
//! persistent storage all live outside this crate, reached through the
//! [`Driver`], [`Networks`][networks::Networks] and
//! [`LayoutSource`][confirm::LayoutSource] traits.

#![cfg_attr(not(feature = "std"), no_std)]

use strum::{Display, EnumIter, EnumString};

mod error;
pub use error::Error;

pub mod paths;

pub mod networks;

pub mod keychain;

pub mod confirm;

use confirm::{ButtonRequestCode, Dialog, DialogEvent};
use keychain::{DerivedKey, Seed};

/// Key-derivation curves supported by the platform
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumIter)]
pub enum Curve {
    Secp256k1,
    Nist256p1,
    Ed25519,
}

/// [`Driver`] trait provides platform support for the gate
///
/// Seed retrieval and dialog presentation are the only two points
/// where a request blocks, requests are strictly serial per device
/// session.
pub trait Driver {
    /// Retrieve the root seed for `curve`
    ///
    /// Blocks while the platform fetches the seed, which may include
    /// prompting for a passphrase.
    fn retrieve_seed(&mut self, curve: Curve) -> Result<Seed, Error>;

    /// Derive the key node at `path` from `seed`
    ///
    /// The derivation math is platform-provided, callers reach this
    /// through [`Keychain::derive`][keychain::Keychain::derive] which
    /// enforces schema access first.
    fn derive_key(&self, seed: &Seed, curve: Curve, path: &[u32]) -> Result<DerivedKey, Error>;

    /// Transmit a button-request code to the peer
    ///
    /// Blocks until the peer acknowledges.
    fn button_request(&mut self, code: ButtonRequestCode) -> Result<(), Error>;

    /// Present a dialog and block for the next user event
    fn present(&mut self, dialog: &Dialog<'_>) -> Result<DialogEvent, Error>;
}

impl<T: Driver> Driver for &mut T {
    fn retrieve_seed(&mut self, curve: Curve) -> Result<Seed, Error> {
        T::retrieve_seed(self, curve)
    }

    fn derive_key(&self, seed: &Seed, curve: Curve, path: &[u32]) -> Result<DerivedKey, Error> {
        T::derive_key(self, seed, curve, path)
    }

    fn button_request(&mut self, code: ButtonRequestCode) -> Result<(), Error> {
        T::button_request(self, code)
    }

    fn present(&mut self, dialog: &Dialog<'_>) -> Result<DialogEvent, Error> {
        T::present(self, dialog)
    }
}
