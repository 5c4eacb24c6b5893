/* embcordic | clock.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* Common shape of every cycle-level model */

/******************************************************************************/

use crate::config::ResetStyle;

/// A synchronous component advanced one clock at a time
///
/// `tick()` computes every register's next value from the current snapshot, then commits them
/// all at once, so no register ever observes a value written during the same tick.
pub trait Clocked {
    type Input;
    type Output;

    /// Advances the component by one clock edge
    fn tick(&mut self, input: Self::Input) -> Self::Output;

    /// Registered outputs, as seen after the last tick
    fn output(&self) -> Self::Output;

    /// Raises the reset line
    ///
    /// Asynchronous resets clear the registers right away, synchronous ones on the next tick.
    /// Components built without a reset ignore it.
    fn reset(&mut self);
}

/******************************************************************************/

/// What a component must do after its reset line was raised
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResetAction {
    Ignore,
    ClearNow,
    ClearOnTick
}

/// Reset input shared by all the models
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResetLine {
    style: ResetStyle,
    pending: bool
}

impl ResetLine {
    pub(crate) fn new(style: ResetStyle) -> Self {
        Self { style, pending: false }
    }

    pub(crate) fn raise(&mut self) -> ResetAction {
        match self.style {
            ResetStyle::None => {
                log::trace!("reset ignored, component built without one");
                ResetAction::Ignore
            }
            ResetStyle::Async => ResetAction::ClearNow,
            ResetStyle::Sync => {
                self.pending = true;
                ResetAction::ClearOnTick
            }
        }
    }

    /// Consumes a pending synchronous reset at the start of a tick
    pub(crate) fn take(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }
}
