// Copyright (c) 2023-2024 The Vaultgate Developers

//! Declarative interaction lookup.
//!
//! Simple handlers skip custom dialog construction entirely: they name
//! a request kind, the kind maps to a [`ButtonRequestCode`] and the
//! dialog comes from an external [`LayoutSource`]. The ordering
//! guarantee is identical to the hand-built flows, the code is always
//! transmitted before the dialog is presented.

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString};

use super::{button_request, dialog::Dialog, wait_decision};
use crate::{Driver, Error};

/// Semantic category of a pending confirmation
///
/// Transmitted to the peer ahead of the dialog, discriminants are
/// wire-stable.
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum ButtonRequestCode {
    Other = 1,
    FeeOverThreshold = 2,
    ConfirmOutput = 3,
    ResetDevice = 4,
    WipeDevice = 6,
    ProtectCall = 7,
    SignTx = 8,
    Address = 10,
    PublicKey = 11,
    UnknownDerivationPath = 15,
}

/// Key/value payload forwarded to the layout lookup
pub type Payload<'a> = &'a [(&'a str, &'a str)];

/// External dialog construction, keyed by request kind and payload
pub trait LayoutSource {
    fn lookup<'a>(&self, kind: &str, payload: Payload<'a>) -> Option<Dialog<'a>>;
}

/// Map a request-kind tag to its button-request code
///
/// Total over all tags with `Other` as the default branch.
// TODO: decide whether an unmapped tag should be rejected instead of
// silently coerced to `Other`
pub fn code_for_kind(kind: &str) -> ButtonRequestCode {
    match kind {
        "confirm_backup1" | "confirm_backup2" | "confirm_reset_device" => {
            ButtonRequestCode::ResetDevice
        }
        "confirm_change_count_over_threshold"
        | "confirm_joint_total"
        | "confirm_nondefault_locktime"
        | "confirm_total" => ButtonRequestCode::SignTx,
        "confirm_feeoverthreshold" => ButtonRequestCode::FeeOverThreshold,
        "confirm_output" => ButtonRequestCode::ConfirmOutput,
        "confirm_path_warning" => ButtonRequestCode::UnknownDerivationPath,
        "confirm_ping" => ButtonRequestCode::ProtectCall,
        "confirm_wipe" => ButtonRequestCode::WipeDevice,
        "show_address" | "show_qr" => ButtonRequestCode::Address,
        "warn_loading_seed" => ButtonRequestCode::Other,
        _ => ButtonRequestCode::Other,
    }
}

/// Confirm a request kind via the declarative layout table
///
/// Returns `true` on confirmation, `false` on cancellation.
pub fn interact<D: Driver, L: LayoutSource>(
    drv: &mut D,
    layouts: &L,
    kind: &str,
    payload: Payload<'_>,
) -> Result<bool, Error> {
    let code = code_for_kind(kind);
    button_request(drv, code)?;

    let dialog = layouts.lookup(kind, payload).ok_or(Error::UnknownLayout)?;

    Ok(wait_decision(drv, &dialog)?.is_confirmed())
}

/// [`interact`], converting cancellation to [`Error::ActionCancelled`]
pub fn require_interact<D: Driver, L: LayoutSource>(
    drv: &mut D,
    layouts: &L,
    kind: &str,
    payload: Payload<'_>,
) -> Result<(), Error> {
    match interact(drv, layouts, kind, payload)? {
        true => Ok(()),
        false => Err(Error::ActionCancelled),
    }
}
