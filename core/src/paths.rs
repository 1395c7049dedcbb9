// Copyright (c) 2023-2024 The Vaultgate Developers

//! BIP-0032 derivation paths and the schema mini-language used to gate
//! access to them.
//!
//! A [`PathSchema`] is compiled from a fixed-length pattern string
//! bound to a slip44 coin id, for example:
//!
//! ```text
//! m/44'/coin_type'/0'/0/*
//! ```
//!
//! Components are literal integers (with `'` marking hardening), the
//! `coin_type'` and `account'` placeholders, or the `*` / `*'`
//! wildcards. Matching requires exact length equality and per-position
//! predicate satisfaction, there is no prefix or suffix matching.

use heapless::Vec;

use crate::Error;

/// Hardened derivation marker (BIP-0032 high bit)
pub const HARDENED: u32 = 1 << 31;

/// Maximum derivation path depth accepted in requests
pub const MAX_PATH_DEPTH: usize = 8;

/// Maximum number of schemas resolved for one request
pub const MAX_SCHEMAS: usize = 4;

/// Check whether a path component carries the hardened marker
pub const fn is_hardened(value: u32) -> bool {
    value & HARDENED != 0
}

/// Strip the hardened marker from a path component
pub const fn unharden(value: u32) -> u32 {
    value & !HARDENED
}

/// Concrete derivation path as received in a request, immutable once built
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct DerivationPath {
    components: Vec<u32, MAX_PATH_DEPTH>,
}

impl DerivationPath {
    /// Build a path from raw components, rejecting over-length paths
    pub fn new(components: &[u32]) -> Result<Self, Error> {
        let components = Vec::from_slice(components).map_err(|_| Error::InvalidLength)?;
        Ok(Self { components })
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.components.get(index).copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.components
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.components.iter().copied()
    }
}

impl core::fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "m")?;
        for c in self.iter() {
            if is_hardened(c) {
                write!(f, "/{}'", unharden(c))?;
            } else {
                write!(f, "/{c}")?;
            }
        }
        Ok(())
    }
}

/// Single position predicate in a compiled schema
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PathToken {
    /// Fixed value with explicit hardening
    Literal { value: u32, hardened: bool },
    /// The bound slip44 coin id, hardened
    CoinType,
    /// Any hardened account index
    Account,
    /// Any hardened value
    WildcardHardened,
    /// Any non-hardened value
    Wildcard,
}

impl PathToken {
    /// Evaluate the predicate for one path component
    fn matches(&self, slip44: u32, component: u32) -> bool {
        match self {
            PathToken::Literal {
                value,
                hardened: true,
            } => component == (*value | HARDENED),
            PathToken::Literal {
                value,
                hardened: false,
            } => component == *value,
            PathToken::CoinType => component == (slip44 | HARDENED),
            PathToken::Account | PathToken::WildcardHardened => is_hardened(component),
            PathToken::Wildcard => !is_hardened(component),
        }
    }
}

/// Compiled path pattern bound to a slip44 coin id
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PathSchema {
    tokens: Vec<PathToken, MAX_PATH_DEPTH>,
    slip44: u32,
}

impl PathSchema {
    /// Compile `pattern` with the coin-type placeholder bound to `slip44`
    pub fn parse(pattern: &str, slip44: u32) -> Result<Self, Error> {
        let mut parts = pattern.split('/');
        if parts.next() != Some("m") {
            return Err(Error::InvalidPattern);
        }

        let mut tokens = Vec::new();
        for part in parts {
            let token = match part {
                "coin_type'" => PathToken::CoinType,
                "account'" => PathToken::Account,
                "*'" => PathToken::WildcardHardened,
                "*" => PathToken::Wildcard,
                _ => {
                    let (digits, hardened) = match part.strip_suffix('\'') {
                        Some(d) => (d, true),
                        None => (part, false),
                    };
                    let value = parse_component(digits)?;
                    PathToken::Literal { value, hardened }
                }
            };

            tokens.push(token).map_err(|_| Error::InvalidPattern)?;
        }

        if tokens.is_empty() {
            return Err(Error::InvalidPattern);
        }

        Ok(Self { tokens, slip44 })
    }

    /// slip44 coin id the schema is bound to
    pub fn slip44(&self) -> u32 {
        self.slip44
    }

    /// Pattern length in components
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check a concrete path against the schema
    ///
    /// Predicates are pure so evaluation order is unobservable, a
    /// length mismatch is always a non-match.
    pub fn matches(&self, path: &DerivationPath) -> bool {
        if path.len() != self.tokens.len() {
            return false;
        }

        self.tokens
            .iter()
            .zip(path.iter())
            .all(|(t, c)| t.matches(self.slip44, c))
    }
}

/// Parse a literal pattern component, hardened marker already stripped
fn parse_component(digits: &str) -> Result<u32, Error> {
    let value: u32 = digits.parse().map_err(|_| Error::InvalidPattern)?;

    // Literal values carry hardening via `'`, never via the raw bit
    if value >= HARDENED {
        return Err(Error::InvalidPattern);
    }

    Ok(value)
}

/// Set of schemas resolved for one request
///
/// The empty set is the first-class "no permission" value, it only
/// becomes an error when consumed by keychain acquisition.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct SchemaSet {
    schemas: Vec<PathSchema, MAX_SCHEMAS>,
}

impl SchemaSet {
    pub const fn new() -> Self {
        Self {
            schemas: Vec::new(),
        }
    }

    pub fn push(&mut self, schema: PathSchema) -> Result<(), Error> {
        self.schemas.push(schema).map_err(|_| Error::InvalidLength)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathSchema> {
        self.schemas.iter()
    }

    /// Check whether any schema in the set permits `path`
    pub fn contains(&self, path: &DerivationPath) -> bool {
        self.schemas.iter().any(|s| s.matches(path))
    }
}
