// Copyright (c) 2023-2024 The Vaultgate Developers

/// Gate errors
///
/// [`AccessDenied`][Error::AccessDenied] and
/// [`ActionCancelled`][Error::ActionCancelled] are normal negative
/// outcomes reported to the peer by the dispatcher, the request simply
/// unwinds and the device returns to idle.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Unexpected dialog event
    #[cfg_attr(feature = "thiserror", error("unexpected dialog event"))]
    UnexpectedEvent = 0x01,

    /// Malformed path schema pattern
    #[cfg_attr(feature = "thiserror", error("malformed path schema pattern"))]
    InvalidPattern = 0x02,

    /// No schema permits the requested path
    #[cfg_attr(feature = "thiserror", error("access denied"))]
    AccessDenied = 0x03,

    /// Path outside the keychain's bound schema set
    #[cfg_attr(feature = "thiserror", error("forbidden key path"))]
    ForbiddenKeyPath = 0x04,

    /// User declined the pending action
    #[cfg_attr(feature = "thiserror", error("action cancelled"))]
    ActionCancelled = 0x05,

    /// Seed retrieval failed
    #[cfg_attr(feature = "thiserror", error("seed unavailable"))]
    SeedUnavailable = 0x06,

    /// No layout registered for the request kind
    #[cfg_attr(feature = "thiserror", error("no layout for request kind"))]
    UnknownLayout = 0x07,

    /// Unknown / not-yet defined error (placeholder)
    #[cfg_attr(feature = "thiserror", error("unknown"))]
    Unknown = 0xf0,
}
