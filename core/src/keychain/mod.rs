// Copyright (c) 2023-2024 The Vaultgate Developers

//! Keychain provisioning.
//!
//! A [`Keychain`] binds retrieved seed material to the [`SchemaSet`]
//! a request resolved to, key derivation outside the bound set is
//! refused. Seed material is cleared when the keychain leaves scope,
//! on every exit path including cancellation unwinds.

use zeroize::Zeroize;

use crate::{
    paths::{DerivationPath, SchemaSet},
    Curve, Driver, Error,
};

mod resolver;
pub use resolver::{
    schemas_from_chain_id, schemas_from_path, with_keychain_from_chain_id,
    with_keychain_from_path, ChainMessage, PathMessage, PATTERNS_ADDRESS,
    PATTERN_ADDRESS, PATTERN_ADDRESS_COMPAT, PATTERN_PUBKEY,
};

/// Root seed material retrieved from the platform
pub struct Seed([u8; 64]);

impl Seed {
    pub const fn from_raw(raw: [u8; 64]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for Seed {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl core::fmt::Debug for Seed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never log seed bytes
        write!(f, "Seed(..)")
    }
}

/// Derived key node handed to signing code, cleared on drop
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    pub const fn from_raw(raw: [u8; 32]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for DerivedKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl core::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DerivedKey(..)")
    }
}

/// Scoped holder of seed material for one curve
///
/// Only constructible through [`acquire`], which fails closed on an
/// empty schema set.
pub struct Keychain {
    seed: Seed,
    curve: Curve,
    schemas: SchemaSet,
}

impl Keychain {
    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Check whether the path is permitted by the bound schema set
    pub fn verify_path(&self, path: &DerivationPath) -> Result<(), Error> {
        if self.schemas.contains(path) {
            Ok(())
        } else {
            #[cfg(feature = "log")]
            log::warn!("forbidden key path: {}", path);

            Err(Error::ForbiddenKeyPath)
        }
    }

    /// Derive the node at `path`, refusing paths outside the schema set
    ///
    /// The derivation math itself is platform-provided via [`Driver`].
    pub fn derive<D: Driver>(&self, drv: &D, path: &DerivationPath) -> Result<DerivedKey, Error> {
        self.verify_path(path)?;

        drv.derive_key(&self.seed, self.curve, path.as_slice())
    }
}

impl Drop for Keychain {
    fn drop(&mut self) {
        // Clear root material on every exit path, including unwinds
        self.seed.zeroize();
    }
}

/// Acquire a keychain scoped to `schemas`
///
/// Fails closed with [`Error::AccessDenied`] when the set is empty,
/// otherwise blocks on seed retrieval (the platform may prompt for a
/// passphrase here).
pub fn acquire<D: Driver>(drv: &mut D, curve: Curve, schemas: SchemaSet) -> Result<Keychain, Error> {
    if schemas.is_empty() {
        #[cfg(feature = "log")]
        log::warn!("keychain acquisition denied: no matching schema");

        return Err(Error::AccessDenied);
    }

    let seed = drv.retrieve_seed(curve)?;

    Ok(Keychain {
        seed,
        curve,
        schemas,
    })
}

#[cfg(test)]
mod test {
    extern crate std;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::confirm::{ButtonRequestCode, Dialog, DialogEvent};
    use crate::paths::{PathSchema, HARDENED};

    /// Driver implementation for test use
    pub struct TestDriver {
        pub seed: [u8; 64],
    }

    impl TestDriver {
        pub fn new() -> Self {
            Self { seed: [0xab; 64] }
        }
    }

    impl Driver for TestDriver {
        fn retrieve_seed(&mut self, _curve: Curve) -> Result<Seed, Error> {
            Ok(Seed::from_raw(self.seed))
        }

        fn derive_key(
            &self,
            seed: &Seed,
            _curve: Curve,
            path: &[u32],
        ) -> Result<DerivedKey, Error> {
            // Stand-in derivation, real math lives in the platform
            let mut raw = [0u8; 32];
            for (i, b) in raw.iter_mut().enumerate() {
                *b = seed.as_bytes()[i] ^ path.len() as u8;
            }
            Ok(DerivedKey::from_raw(raw))
        }

        fn button_request(&mut self, _code: ButtonRequestCode) -> Result<(), Error> {
            Ok(())
        }

        fn present(&mut self, _dialog: &Dialog<'_>) -> Result<DialogEvent, Error> {
            Err(Error::Unknown)
        }
    }

    fn schemas(slip44: u32) -> SchemaSet {
        let mut set = SchemaSet::new();
        set.push(PathSchema::parse("m/44'/coin_type'/0'/0/*", slip44).unwrap())
            .unwrap();
        set
    }

    /// Empty schema set always denies, for every curve
    #[test]
    fn acquire_empty_set_denies() {
        let mut drv = TestDriver::new();

        for curve in Curve::iter() {
            let r = acquire(&mut drv, curve, SchemaSet::new());
            assert!(matches!(r, Err(Error::AccessDenied)));
        }
    }

    #[test]
    fn acquire_non_empty_set() {
        let mut drv = TestDriver::new();

        let keychain = acquire(&mut drv, Curve::Secp256k1, schemas(60)).unwrap();
        assert_eq!(keychain.curve(), Curve::Secp256k1);
        assert_eq!(keychain.schemas().len(), 1);
    }

    #[test]
    fn derive_in_schema() {
        let mut drv = TestDriver::new();
        let keychain = acquire(&mut drv, Curve::Secp256k1, schemas(60)).unwrap();

        let path = DerivationPath::new(&[44 | HARDENED, 60 | HARDENED, HARDENED, 0, 5]).unwrap();
        let key = keychain.derive(&drv, &path).unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn derive_outside_schema_forbidden() {
        let mut drv = TestDriver::new();
        let keychain = acquire(&mut drv, Curve::Secp256k1, schemas(60)).unwrap();

        // Wrong coin id and wrong shape
        let tests = &[
            &[44 | HARDENED, 0 | HARDENED, HARDENED, 0, 5][..],
            &[44 | HARDENED, 60 | HARDENED, HARDENED, 0][..],
            &[][..],
        ];

        for components in tests {
            let path = DerivationPath::new(components).unwrap();
            assert_eq!(
                keychain.derive(&drv, &path).err(),
                Some(Error::ForbiddenKeyPath),
                "path {path} should be refused"
            );
        }
    }

    /// Seed material is cleared when the keychain is released
    #[test]
    fn seed_zeroized_on_drop() {
        let mut seed = Seed::from_raw([0xcd; 64]);
        seed.zeroize();
        assert_eq!(seed.as_bytes(), &[0u8; 64]);

        let mut key = DerivedKey::from_raw([0xef; 32]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
    }
}
