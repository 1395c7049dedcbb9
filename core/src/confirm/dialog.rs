// Copyright (c) 2023-2024 The Vaultgate Developers

//! Dialog variants presented for user confirmation.
//!
//! Rendering is external, the gate only describes what must be shown
//! and which actions are reachable. Paginated presentations carry
//! their actions on the final page only, earlier pages are
//! informational.

use heapless::Vec;

use crate::Error;

/// Maximum pages in a paginated presentation
pub const MAX_PAGES: usize = 8;

/// Dialog body content, rendered by the platform
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Layout<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> Layout<'a> {
    pub const fn new(title: &'a str, body: &'a str) -> Self {
        Self { title, body }
    }
}

/// Button set attached to an actionable page
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Actions<'a> {
    pub confirm: Option<&'a str>,
    pub cancel: Option<&'a str>,
    /// Confirm requires a sustained hold rather than a tap
    pub hold: bool,
}

impl Actions<'_> {
    /// Default tap-to-confirm action set
    pub const CONFIRM: Actions<'static> = Actions {
        confirm: Some("CONFIRM"),
        cancel: Some("CANCEL"),
        hold: false,
    };

    /// Default hold-to-confirm action set
    pub const HOLD: Actions<'static> = Actions {
        confirm: Some("HOLD TO CONFIRM"),
        cancel: Some("CANCEL"),
        hold: true,
    };
}

impl Default for Actions<'_> {
    fn default() -> Self {
        Self::CONFIRM
    }
}

/// One segment of a paginated presentation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Page<'a> {
    pub layout: Layout<'a>,
    /// `Some` on the final page only
    pub actions: Option<Actions<'a>>,
}

/// Ordered page sequence, actionable on the last page
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Pages<'a> {
    pages: Vec<Page<'a>, MAX_PAGES>,
}

impl<'a> Pages<'a> {
    /// Build a page sequence, attaching `actions` to the final page
    fn new(layouts: &[Layout<'a>], actions: Actions<'a>) -> Result<Self, Error> {
        if layouts.is_empty() {
            return Err(Error::InvalidLength);
        }

        let mut pages = Vec::new();
        for (i, layout) in layouts.iter().enumerate() {
            let actions = if i == layouts.len() - 1 {
                Some(actions)
            } else {
                None
            };

            pages
                .push(Page {
                    layout: *layout,
                    actions,
                })
                .map_err(|_| Error::InvalidLength)?;
        }

        Ok(Self { pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page<'a>> {
        self.pages.iter()
    }

    pub fn last(&self) -> Option<&Page<'a>> {
        self.pages.last()
    }
}

/// Dialog content prior to action attachment
#[derive(Copy, Clone, Debug)]
pub enum Content<'a> {
    Single(Layout<'a>),
    /// Ordered segments, informational except for the last
    Paginated(&'a [Layout<'a>]),
}

/// A pending user decision
///
/// Each presented dialog produces exactly one terminal [`Decision`],
/// except [`InfoConfirm`][Dialog::InfoConfirm] which may also yield
/// non-terminal info requests first.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Dialog<'a> {
    /// Single tap to confirm or cancel
    Confirm {
        layout: Layout<'a>,
        actions: Actions<'a>,
    },
    /// Sustained hold to confirm
    HoldToConfirm {
        layout: Layout<'a>,
        actions: Actions<'a>,
    },
    /// Confirm, cancel, or request auxiliary info
    InfoConfirm {
        layout: Layout<'a>,
        actions: Actions<'a>,
        /// Label for the info action
        info: &'a str,
    },
    /// Multi-segment tap-to-confirm
    PaginatedConfirm(Pages<'a>),
    /// Multi-segment hold-to-confirm
    PaginatedHold(Pages<'a>),
}

impl<'a> Dialog<'a> {
    /// Build a tap-to-confirm dialog
    pub fn confirm(content: Content<'a>, actions: Actions<'a>) -> Result<Self, Error> {
        let actions = Actions {
            hold: false,
            ..actions
        };

        match content {
            Content::Single(layout) => Ok(Dialog::Confirm { layout, actions }),
            Content::Paginated(layouts) => {
                Ok(Dialog::PaginatedConfirm(Pages::new(layouts, actions)?))
            }
        }
    }

    /// Build a hold-to-confirm dialog
    pub fn hold_to_confirm(content: Content<'a>, actions: Actions<'a>) -> Result<Self, Error> {
        let actions = Actions {
            hold: true,
            ..actions
        };

        match content {
            Content::Single(layout) => Ok(Dialog::HoldToConfirm { layout, actions }),
            Content::Paginated(layouts) => {
                Ok(Dialog::PaginatedHold(Pages::new(layouts, actions)?))
            }
        }
    }

    /// Build a three-way info dialog (never paginated)
    pub fn info_confirm(layout: Layout<'a>, actions: Actions<'a>, info: &'a str) -> Self {
        Dialog::InfoConfirm {
            layout,
            actions,
            info,
        }
    }

    /// Whether the info action is reachable from this dialog
    pub fn has_info(&self) -> bool {
        matches!(self, Dialog::InfoConfirm { .. })
    }
}

/// Single user event produced by a presented dialog
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DialogEvent {
    Confirmed,
    Cancelled,
    /// Auxiliary info requested, non-terminal
    InfoRequested,
}

/// Terminal outcome of a confirmation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Decision {
    Confirmed,
    Cancelled,
}

impl Decision {
    pub fn is_confirmed(&self) -> bool {
        *self == Decision::Confirmed
    }
}
