// Copyright (c) 2023-2024 The Vaultgate Developers

//! User confirmation engine.
//!
//! Every effectful handler passes through here before its side effects
//! run: a [`ButtonRequestCode`] is transmitted to the peer, a
//! [`Dialog`] is presented, and the handler continues only on an
//! explicit confirmation. Cancellation surfaces as
//! [`Error::ActionCancelled`] and unwinds the whole request.
//!
//! Presentation blocks on the platform [`Driver`], there is exactly
//! one dialog in flight per device session.

use crate::{Driver, Error};

mod dialog;
pub use dialog::{
    Actions, Content, Decision, Dialog, DialogEvent, Layout, Page, Pages, MAX_PAGES,
};

mod interact;
pub use interact::{
    code_for_kind, interact, require_interact, ButtonRequestCode, LayoutSource, Payload,
};

/// Transmit the button request announcing a pending decision
///
/// Must complete before the dialog is presented, the peer expects the
/// code strictly ahead of any render.
pub fn button_request<D: Driver>(drv: &mut D, code: ButtonRequestCode) -> Result<(), Error> {
    #[cfg(feature = "log")]
    log::debug!("button request: {}", code);

    drv.button_request(code)
}

/// Present `dialog` and block for a terminal decision
///
/// Info requests are only reachable from [`info_confirm`], anywhere
/// else they indicate a platform fault.
fn wait_decision<D: Driver>(drv: &mut D, dialog: &Dialog<'_>) -> Result<Decision, Error> {
    match drv.present(dialog)? {
        DialogEvent::Confirmed => Ok(Decision::Confirmed),
        DialogEvent::Cancelled => Ok(Decision::Cancelled),
        DialogEvent::InfoRequested => Err(Error::UnexpectedEvent),
    }
}

/// Request a tap confirmation for `content`
///
/// Emits `code`, presents the dialog and returns the decision as a
/// bool, the first tap is terminal.
pub fn confirm<D: Driver>(
    drv: &mut D,
    content: Content<'_>,
    code: ButtonRequestCode,
    actions: Actions<'_>,
) -> Result<bool, Error> {
    button_request(drv, code)?;

    let dialog = Dialog::confirm(content, actions)?;

    Ok(wait_decision(drv, &dialog)?.is_confirmed())
}

/// Request a hold-gesture confirmation for `content`
pub fn hold_to_confirm<D: Driver>(
    drv: &mut D,
    content: Content<'_>,
    code: ButtonRequestCode,
    actions: Actions<'_>,
) -> Result<bool, Error> {
    button_request(drv, code)?;

    let dialog = Dialog::hold_to_confirm(content, actions)?;

    Ok(wait_decision(drv, &dialog)?.is_confirmed())
}

/// Three-way confirmation loop with an auxiliary info action
///
/// Each info request runs `info` (which may itself block) and
/// re-presents the same dialog, the loop terminates only on a
/// confirm or cancel.
pub fn info_confirm<D, F>(
    drv: &mut D,
    layout: Layout<'_>,
    code: ButtonRequestCode,
    actions: Actions<'_>,
    info_label: &str,
    mut info: F,
) -> Result<bool, Error>
where
    D: Driver,
    F: FnMut(&mut D) -> Result<(), Error>,
{
    button_request(drv, code)?;

    let dialog = Dialog::info_confirm(layout, actions, info_label);

    loop {
        match drv.present(&dialog)? {
            DialogEvent::Confirmed => return Ok(true),
            DialogEvent::Cancelled => return Ok(false),
            DialogEvent::InfoRequested => info(drv)?,
        }
    }
}

/// [`confirm`], converting cancellation to [`Error::ActionCancelled`]
///
/// The single signal handlers use to abort before any side effect.
pub fn require_confirm<D: Driver>(
    drv: &mut D,
    content: Content<'_>,
    code: ButtonRequestCode,
    actions: Actions<'_>,
) -> Result<(), Error> {
    match confirm(drv, content, code, actions)? {
        true => Ok(()),
        false => Err(Error::ActionCancelled),
    }
}

/// [`hold_to_confirm`], converting cancellation to [`Error::ActionCancelled`]
pub fn require_hold_to_confirm<D: Driver>(
    drv: &mut D,
    content: Content<'_>,
    code: ButtonRequestCode,
    actions: Actions<'_>,
) -> Result<(), Error> {
    match hold_to_confirm(drv, content, code, actions)? {
        true => Ok(()),
        false => Err(Error::ActionCancelled),
    }
}
