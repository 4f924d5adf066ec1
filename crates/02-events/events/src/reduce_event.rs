//! Pure event reducer for the application model.

use crate::scratch::{ScratchArena, ScratchError};
use crate::types::Event;
use store::Model;
use thiserror::Error;

/// Failures a reducer may report after the payload already decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReduceError {
    #[error(transparent)]
    Scratch(#[from] ScratchError),
}

/// Trait for applying decoded events to a working copy.
///
/// Implementations touch nothing but `self` and the scratch arena: no I/O and
/// no re-dispatch.
pub trait EventReducer {
    /// Applies `event` to `self`.
    fn reduce_event(
        &mut self,
        event: &Event<'_>,
        scratch: &mut ScratchArena,
    ) -> Result<(), ReduceError>;
}

impl EventReducer for Model {
    fn reduce_event(
        &mut self,
        event: &Event<'_>,
        scratch: &mut ScratchArena,
    ) -> Result<(), ReduceError> {
        match *event {
            Event::AppInit => self.ui.loading = false,
            Event::AppForeground => self.ui.foreground = true,
            Event::AppBackground => self.ui.foreground = false,
            Event::AppTerminate | Event::AppLowMemory | Event::Gesture(_) => {}
            Event::ButtonPress { button_id } => self.app.last_button = button_id,
            Event::TextInput(text) => {
                let sanitized = strip_controls(text, scratch)?;
                self.app.input.set(sanitized);
            }
            Event::TextCommit => self.app.input.clear(),
            Event::Selection(index) => self.app.selection = index,
            Event::Scroll(offset) => self.ui.scroll_offset = offset,
            Event::Navigate(screen) => {
                if screen != self.ui.screen {
                    self.ui.previous_screen = self.ui.screen;
                    self.ui.screen = screen;
                }
            }
            Event::NavigateBack => {
                let back = self.ui.previous_screen;
                self.ui.previous_screen = self.ui.screen;
                self.ui.screen = back;
            }
            Event::TabSwitch(tab) => self.ui.tab = tab,
            Event::CounterIncrement => self.app.counter = self.app.counter.wrapping_add(1),
            Event::CounterDecrement => self.app.counter = self.app.counter.wrapping_sub(1),
            Event::CounterReset => self.app.counter = 0,
        }
        Ok(())
    }
}

fn strip_controls<'s>(text: &[u8], scratch: &'s mut ScratchArena) -> Result<&'s [u8], ScratchError> {
    let out = scratch.alloc(text.len())?;
    let mut len = 0;
    for &byte in text.iter().filter(|b| !b.is_ascii_control()) {
        out[len] = byte;
        len += 1;
    }
    Ok(&out[..len])
}
