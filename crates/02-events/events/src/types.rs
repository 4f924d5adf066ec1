//! Event codes and payload decoding.
//!
//! The catalog is a closed, versioned set. Codes outside it decode to
//! [`DecodeError::Unknown`], which callers treat as a silent no-op so that
//! newer shells can talk to older cores.

use store::{Screen, INPUT_CAPACITY};
use thiserror::Error;

/// Wire codes for every event the built-in reducer understands.
pub mod event_type {
    pub const APP_INIT: u32 = 0x0001;
    pub const APP_TERMINATE: u32 = 0x0002;
    pub const APP_FOREGROUND: u32 = 0x0003;
    pub const APP_BACKGROUND: u32 = 0x0004;
    pub const APP_LOW_MEMORY: u32 = 0x0005;

    pub const BUTTON_PRESS: u32 = 0x0100;
    pub const TEXT_INPUT: u32 = 0x0101;
    pub const TEXT_COMMIT: u32 = 0x0102;
    pub const SELECTION: u32 = 0x0103;
    pub const SCROLL: u32 = 0x0104;
    pub const GESTURE: u32 = 0x0105;

    pub const NAVIGATE: u32 = 0x0200;
    pub const NAVIGATE_BACK: u32 = 0x0201;
    pub const TAB_SWITCH: u32 = 0x0202;

    pub const COUNTER_INCREMENT: u32 = 0x1000;
    pub const COUNTER_DECREMENT: u32 = 0x1001;
    pub const COUNTER_RESET: u32 = 0x1002;

    /// First code reserved for application-defined events.
    pub const CUSTOM_BASE: u32 = 0x2000;
}

/// Largest text payload accepted by `TEXT_INPUT`.
pub const MAX_TEXT_PAYLOAD: usize = INPUT_CAPACITY;

/// Discriminant of a recognized event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventKind {
    AppInit = event_type::APP_INIT,
    AppTerminate = event_type::APP_TERMINATE,
    AppForeground = event_type::APP_FOREGROUND,
    AppBackground = event_type::APP_BACKGROUND,
    AppLowMemory = event_type::APP_LOW_MEMORY,
    ButtonPress = event_type::BUTTON_PRESS,
    TextInput = event_type::TEXT_INPUT,
    TextCommit = event_type::TEXT_COMMIT,
    Selection = event_type::SELECTION,
    Scroll = event_type::SCROLL,
    Gesture = event_type::GESTURE,
    Navigate = event_type::NAVIGATE,
    NavigateBack = event_type::NAVIGATE_BACK,
    TabSwitch = event_type::TAB_SWITCH,
    CounterIncrement = event_type::COUNTER_INCREMENT,
    CounterDecrement = event_type::COUNTER_DECREMENT,
    CounterReset = event_type::COUNTER_RESET,
}

impl EventKind {
    /// Looks up a wire code. Returns `None` for codes outside the catalog.
    pub fn from_code(code: u32) -> Option<Self> {
        use EventKind as K;
        let kind = match code {
            event_type::APP_INIT => K::AppInit,
            event_type::APP_TERMINATE => K::AppTerminate,
            event_type::APP_FOREGROUND => K::AppForeground,
            event_type::APP_BACKGROUND => K::AppBackground,
            event_type::APP_LOW_MEMORY => K::AppLowMemory,
            event_type::BUTTON_PRESS => K::ButtonPress,
            event_type::TEXT_INPUT => K::TextInput,
            event_type::TEXT_COMMIT => K::TextCommit,
            event_type::SELECTION => K::Selection,
            event_type::SCROLL => K::Scroll,
            event_type::GESTURE => K::Gesture,
            event_type::NAVIGATE => K::Navigate,
            event_type::NAVIGATE_BACK => K::NavigateBack,
            event_type::TAB_SWITCH => K::TabSwitch,
            event_type::COUNTER_INCREMENT => K::CounterIncrement,
            event_type::COUNTER_DECREMENT => K::CounterDecrement,
            event_type::COUNTER_RESET => K::CounterReset,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Minimum payload length the reducer needs for this event.
    pub fn required_payload(self) -> usize {
        match self {
            EventKind::ButtonPress
            | EventKind::Selection
            | EventKind::Scroll
            | EventKind::Gesture
            | EventKind::Navigate
            | EventKind::TabSwitch => 4,
            _ => 0,
        }
    }
}

/// Decoded event with a read-only view of its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    AppInit,
    AppTerminate,
    AppForeground,
    AppBackground,
    AppLowMemory,
    ButtonPress { button_id: u32 },
    TextInput(&'a [u8]),
    TextCommit,
    Selection(u32),
    Scroll(i32),
    Gesture(u32),
    Navigate(Screen),
    NavigateBack,
    TabSwitch(u32),
    CounterIncrement,
    CounterDecrement,
    CounterReset,
}

/// Reasons a `(code, payload)` pair could not become an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown event type {0:#06x}")]
    Unknown(u32),

    #[error("payload for {kind:?} needs {required} bytes, got {got}")]
    TooShort {
        kind: EventKind,
        required: usize,
        got: usize,
    },

    #[error("payload for {kind:?} exceeds {max} bytes (got {got})")]
    TooLong {
        kind: EventKind,
        max: usize,
        got: usize,
    },

    #[error("invalid screen id {0}")]
    InvalidScreen(u32),
}

impl<'a> Event<'a> {
    /// Decodes a host event. Fixed-size payloads are little-endian; trailing bytes are ignored.
    pub fn decode(code: u32, payload: &'a [u8]) -> Result<Self, DecodeError> {
        let kind = EventKind::from_code(code).ok_or(DecodeError::Unknown(code))?;
        let required = kind.required_payload();
        if payload.len() < required {
            return Err(DecodeError::TooShort {
                kind,
                required,
                got: payload.len(),
            });
        }

        let event = match kind {
            EventKind::AppInit => Event::AppInit,
            EventKind::AppTerminate => Event::AppTerminate,
            EventKind::AppForeground => Event::AppForeground,
            EventKind::AppBackground => Event::AppBackground,
            EventKind::AppLowMemory => Event::AppLowMemory,
            EventKind::ButtonPress => Event::ButtonPress {
                button_id: read_u32(payload),
            },
            EventKind::TextInput => {
                if payload.len() > MAX_TEXT_PAYLOAD {
                    return Err(DecodeError::TooLong {
                        kind,
                        max: MAX_TEXT_PAYLOAD,
                        got: payload.len(),
                    });
                }
                Event::TextInput(payload)
            }
            EventKind::TextCommit => Event::TextCommit,
            EventKind::Selection => Event::Selection(read_u32(payload)),
            EventKind::Scroll => Event::Scroll(read_u32(payload) as i32),
            EventKind::Gesture => Event::Gesture(read_u32(payload)),
            EventKind::Navigate => {
                let raw = read_u32(payload);
                Event::Navigate(Screen::from_u32(raw).ok_or(DecodeError::InvalidScreen(raw))?)
            }
            EventKind::NavigateBack => Event::NavigateBack,
            EventKind::TabSwitch => Event::TabSwitch(read_u32(payload)),
            EventKind::CounterIncrement => Event::CounterIncrement,
            EventKind::CounterDecrement => Event::CounterDecrement,
            EventKind::CounterReset => Event::CounterReset,
        };
        Ok(event)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::AppInit => EventKind::AppInit,
            Event::AppTerminate => EventKind::AppTerminate,
            Event::AppForeground => EventKind::AppForeground,
            Event::AppBackground => EventKind::AppBackground,
            Event::AppLowMemory => EventKind::AppLowMemory,
            Event::ButtonPress { .. } => EventKind::ButtonPress,
            Event::TextInput(_) => EventKind::TextInput,
            Event::TextCommit => EventKind::TextCommit,
            Event::Selection(_) => EventKind::Selection,
            Event::Scroll(_) => EventKind::Scroll,
            Event::Gesture(_) => EventKind::Gesture,
            Event::Navigate(_) => EventKind::Navigate,
            Event::NavigateBack => EventKind::NavigateBack,
            Event::TabSwitch(_) => EventKind::TabSwitch,
            Event::CounterIncrement => EventKind::CounterIncrement,
            Event::CounterDecrement => EventKind::CounterDecrement,
            Event::CounterReset => EventKind::CounterReset,
        }
    }
}

// Callers check the length first.
fn read_u32(payload: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&payload[..4]);
    u32::from_le_bytes(raw)
}
