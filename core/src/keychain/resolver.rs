// Copyright (c) 2023-2024 The Vaultgate Developers

//! Schema-set resolution and handler wrapping.
//!
//! A request resolves to a [`SchemaSet`] either from its embedded
//! derivation path or from an explicit chain id, then a keychain is
//! acquired for the set and the handler body runs with it in scope.
//! [`with_keychain_from_path`] and [`with_keychain_from_chain_id`] are
//! the pipeline stages wrapping handlers, the keychain is always an
//! explicit parameter.

use crate::{
    keychain::{acquire, Keychain},
    networks::Networks,
    paths::{is_hardened, unharden, DerivationPath, PathSchema, SchemaSet},
    Curve, Driver, Error,
};

// Account-based chains should use m/44'/coin_type'/account' for
// everything, but the common tooling iterates the address index with
// the account pinned to zero. The compat pattern accepts that scheme.
pub const PATTERN_ADDRESS_COMPAT: &str = "m/44'/coin_type'/0'/0/*";

/// Standard five-level address pattern
pub const PATTERN_ADDRESS: &str = "m/44'/coin_type'/account'/*/*";

/// Account-level public key export pattern
pub const PATTERN_PUBKEY: &str = "m/44'/coin_type'/account'/*";

/// Address-derivation patterns, the set bound for signing requests
pub const PATTERNS_ADDRESS: &[&str] = &[PATTERN_ADDRESS_COMPAT, PATTERN_ADDRESS];

/// Message carrying a derivation path
pub trait PathMessage {
    fn path(&self) -> &DerivationPath;
}

/// Signing message optionally pinned to a chain id
pub trait ChainMessage: PathMessage {
    fn chain_id(&self) -> Option<u64>;
    fn tx_type(&self) -> Option<u64>;
}

/// Bind `patterns` to `slip44`, skipping any that fail to compile
///
/// Patterns are crate constants so a compile failure is a programming
/// error, resolution stays fail-closed either way.
fn bind_patterns(schemas: &mut SchemaSet, patterns: &[&str], slip44: u32) {
    for pattern in patterns {
        match PathSchema::parse(pattern, slip44) {
            Ok(schema) => {
                let _ = schemas.push(schema);
            }
            Err(_e) => {
                #[cfg(feature = "log")]
                log::error!("invalid schema pattern {}: {:?}", pattern, _e);
            }
        }
    }
}

/// Resolve a schema set from the request's own derivation path
///
/// The second path element must be hardened and name a coin known to
/// the metadata table, anything else resolves to the empty (deny) set.
pub fn schemas_from_path<N: Networks>(
    networks: &N,
    patterns: &[&str],
    path: &DerivationPath,
) -> SchemaSet {
    let mut schemas = SchemaSet::new();

    if path.len() < 2 {
        return schemas;
    }

    let slip44_hardened = match path.get(1) {
        Some(v) if is_hardened(v) => v,
        _ => return schemas,
    };

    if networks.by_slip44_hardened(slip44_hardened).is_none() {
        return schemas;
    }

    bind_patterns(&mut schemas, patterns, unharden(slip44_hardened));

    #[cfg(feature = "log")]
    log::debug!(
        "resolved {} schema(s) from path {}",
        schemas.len(),
        path
    );

    schemas
}

/// Resolve a schema set from the request's chain id
///
/// Without an explicit chain id this falls back to path resolution.
/// Only the address patterns are bound here, public key export is
/// deliberately excluded for chain-id scoped requests.
pub fn schemas_from_chain_id<N: Networks, M: ChainMessage>(networks: &N, msg: &M) -> SchemaSet {
    let chain_id = match msg.chain_id() {
        Some(id) => id,
        None => return schemas_from_path(networks, PATTERNS_ADDRESS, msg.path()),
    };

    let info = match networks.by_chain_id(chain_id) {
        Some(info) => info,
        None => {
            #[cfg(feature = "log")]
            log::debug!("unknown chain id {}", chain_id);

            return SchemaSet::new();
        }
    };

    let slip44 = networks
        .remap_slip44(chain_id, msg.tx_type())
        .unwrap_or(info.slip44);

    let mut schemas = SchemaSet::new();
    bind_patterns(&mut schemas, PATTERNS_ADDRESS, slip44);
    schemas
}

/// Wrap `handler` with path-based schema resolution and a scoped keychain
///
/// Returns a plain `(driver, message) -> result` handler. Seed material
/// is released when the wrapper returns, regardless of outcome.
pub fn with_keychain_from_path<'a, D, N, M, O, H>(
    networks: &'a N,
    curve: Curve,
    patterns: &'a [&'static str],
    handler: H,
) -> impl FnOnce(&mut D, &M) -> Result<O, Error> + 'a
where
    D: Driver,
    N: Networks,
    M: PathMessage,
    H: FnOnce(&mut D, &M, &Keychain) -> Result<O, Error> + 'a,
{
    move |drv, msg| {
        let schemas = schemas_from_path(networks, patterns, msg.path());
        let keychain = acquire(drv, curve, schemas)?;

        let r = handler(drv, msg, &keychain);

        // Root material cleared here whatever the handler returned
        drop(keychain);

        r
    }
}

/// Wrap `handler` with chain-id schema resolution and a scoped keychain
///
/// Signing-request counterpart of [`with_keychain_from_path`], bound to
/// the address patterns only.
pub fn with_keychain_from_chain_id<'a, D, N, M, O, H>(
    networks: &'a N,
    curve: Curve,
    handler: H,
) -> impl FnOnce(&mut D, &M) -> Result<O, Error> + 'a
where
    D: Driver,
    N: Networks,
    M: ChainMessage,
    H: FnOnce(&mut D, &M, &Keychain) -> Result<O, Error> + 'a,
{
    move |drv, msg| {
        let schemas = schemas_from_chain_id(networks, msg);
        let keychain = acquire(drv, curve, schemas)?;

        let r = handler(drv, msg, &keychain);

        drop(keychain);

        r
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use super::*;
    use crate::keychain::test::TestDriver;
    use crate::networks::CoinInfo;
    use crate::paths::HARDENED;

    const SLIP44_SPECIAL: u32 = 5_718_350;

    /// Test metadata table with a Wanchain-style remap entry
    struct TestNetworks;

    const COINS: &[CoinInfo] = &[
        CoinInfo {
            chain_id: 1,
            slip44: 60,
            shortcut: "ETH",
            name: "Ethereum",
        },
        CoinInfo {
            chain_id: 3,
            slip44: 60,
            shortcut: "WAN",
            name: "Wanchain",
        },
    ];

    impl Networks for TestNetworks {
        fn by_slip44_hardened(&self, slip44_hardened: u32) -> Option<&CoinInfo> {
            COINS.iter().find(|c| c.slip44_hardened() == slip44_hardened)
        }

        fn by_chain_id(&self, chain_id: u64) -> Option<&CoinInfo> {
            COINS.iter().find(|c| c.chain_id == chain_id)
        }

        fn remap_slip44(&self, chain_id: u64, tx_type: Option<u64>) -> Option<u32> {
            match (chain_id, tx_type) {
                (3, Some(1)) | (3, Some(6)) => Some(SLIP44_SPECIAL),
                _ => None,
            }
        }
    }

    struct SignRequest {
        path: DerivationPath,
        chain_id: Option<u64>,
        tx_type: Option<u64>,
    }

    impl PathMessage for SignRequest {
        fn path(&self) -> &DerivationPath {
            &self.path
        }
    }

    impl ChainMessage for SignRequest {
        fn chain_id(&self) -> Option<u64> {
            self.chain_id
        }

        fn tx_type(&self) -> Option<u64> {
            self.tx_type
        }
    }

    fn eth_path() -> DerivationPath {
        DerivationPath::new(&[44 | HARDENED, 60 | HARDENED, HARDENED, 0, 5]).unwrap()
    }

    #[test]
    fn from_path_known_coin() {
        let schemas = schemas_from_path(&TestNetworks, PATTERNS_ADDRESS, &eth_path());

        assert_eq!(schemas.len(), 2);
        assert!(schemas.contains(&eth_path()));
        assert!(schemas.iter().all(|s| s.slip44() == 60));
    }

    #[test]
    fn from_path_denies() {
        // Too short
        let p = DerivationPath::new(&[44 | HARDENED]).unwrap();
        assert!(schemas_from_path(&TestNetworks, PATTERNS_ADDRESS, &p).is_empty());

        // Second element not hardened
        let p = DerivationPath::new(&[44 | HARDENED, 60, HARDENED, 0, 5]).unwrap();
        assert!(schemas_from_path(&TestNetworks, PATTERNS_ADDRESS, &p).is_empty());

        // Unknown slip44 id
        let p = DerivationPath::new(&[44 | HARDENED, 99 | HARDENED, HARDENED, 0, 5]).unwrap();
        assert!(schemas_from_path(&TestNetworks, PATTERNS_ADDRESS, &p).is_empty());
    }

    #[test]
    fn from_chain_id_falls_back_to_path() {
        let msg = SignRequest {
            path: eth_path(),
            chain_id: None,
            tx_type: None,
        };

        let schemas = schemas_from_chain_id(&TestNetworks, &msg);
        assert_eq!(schemas.len(), 2);
        assert!(schemas.contains(&eth_path()));
    }

    #[test]
    fn from_chain_id_unknown_denies() {
        let msg = SignRequest {
            path: eth_path(),
            chain_id: Some(61),
            tx_type: None,
        };

        assert!(schemas_from_chain_id(&TestNetworks, &msg).is_empty());
    }

    #[test]
    fn from_chain_id_remap() {
        let msg = SignRequest {
            path: eth_path(),
            chain_id: Some(3),
            tx_type: Some(6),
        };

        let schemas = schemas_from_chain_id(&TestNetworks, &msg);
        assert!(!schemas.is_empty());
        assert!(schemas.iter().all(|s| s.slip44() == SLIP44_SPECIAL));

        // Other transaction types keep the table id
        let msg = SignRequest {
            path: eth_path(),
            chain_id: Some(3),
            tx_type: Some(0),
        };
        let schemas = schemas_from_chain_id(&TestNetworks, &msg);
        assert!(schemas.iter().all(|s| s.slip44() == 60));
    }

    /// Chain-id resolution never grants the public key export pattern
    #[test]
    fn from_chain_id_excludes_pubkey_pattern() {
        let msg = SignRequest {
            path: eth_path(),
            chain_id: Some(1),
            tx_type: None,
        };

        let schemas = schemas_from_chain_id(&TestNetworks, &msg);
        let pubkey = PathSchema::parse(PATTERN_PUBKEY, 60).unwrap();

        assert!(!schemas.is_empty());
        assert!(schemas.iter().all(|s| *s != pubkey));

        // An account-level export path stays outside the set
        let p = DerivationPath::new(&[44 | HARDENED, 60 | HARDENED, HARDENED, 0]).unwrap();
        assert!(!schemas.contains(&p));
    }

    #[test]
    fn wrapped_handler_runs_with_keychain() {
        let mut drv = TestDriver::new();
        let msg = SignRequest {
            path: eth_path(),
            chain_id: Some(1),
            tx_type: None,
        };

        let handler = with_keychain_from_chain_id(
            &TestNetworks,
            Curve::Secp256k1,
            |drv: &mut TestDriver, msg: &SignRequest, keychain: &Keychain| {
                keychain.derive(drv, msg.path()).map(|_| true)
            },
        );

        assert_eq!(handler(&mut drv, &msg), Ok(true));
    }

    #[test]
    fn wrapped_handler_denied_before_body() {
        let mut drv = TestDriver::new();
        let msg = SignRequest {
            path: eth_path(),
            chain_id: Some(61),
            tx_type: None,
        };

        let handler = with_keychain_from_chain_id(
            &TestNetworks,
            Curve::Secp256k1,
            |_drv: &mut TestDriver,
             _msg: &SignRequest,
             _keychain: &Keychain|
             -> Result<bool, Error> {
                panic!("handler body must not run when access is denied")
            },
        );

        assert_eq!(handler(&mut drv, &msg), Err(Error::AccessDenied));
    }
}
