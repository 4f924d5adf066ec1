//! Application and presentation state shared by reducers and the ABI layer.
//!
//! Field declaration order matters: the diff engine assigns changed-mask bits
//! in the order fields appear here, `AppState` first and `UiState` second.

use std::fmt;

/// Capacity of the bounded text input buffer, in bytes.
pub const INPUT_CAPACITY: usize = 256;

/// Screen currently presented by the host shell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Screen {
    /// Landing screen shown after init.
    #[default]
    Home = 0,
    /// Detail view for the current selection.
    Detail = 1,
    /// Settings screen.
    Settings = 2,
}

impl Screen {
    /// Decodes a screen identifier received from the host.
    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Screen::Home),
            1 => Some(Screen::Detail),
            2 => Some(Screen::Settings),
            _ => None,
        }
    }

    /// Returns the wire identifier for this screen.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Fixed-capacity byte buffer with an explicit length.
///
/// Bytes past `len` are always zero, so two buffers are equal exactly when
/// their lengths and live contents match.
#[derive(Clone, Copy)]
pub struct InputBuffer {
    bytes: [u8; INPUT_CAPACITY],
    len: usize,
}

impl InputBuffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0; INPUT_CAPACITY],
            len: 0,
        }
    }

    /// Replaces the contents with `src`, truncating to [`INPUT_CAPACITY`].
    ///
    /// Returns the number of bytes stored.
    pub fn set(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(INPUT_CAPACITY);
        self.bytes[..n].copy_from_slice(&src[..n]);
        self.bytes[n..].fill(0);
        self.len = n;
        n
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.len = 0;
    }

    /// Live bytes of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Full backing storage, including the zeroed tail.
    pub fn raw(&self) -> &[u8; INPUT_CAPACITY] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for InputBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for InputBuffer {}

impl fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputBuffer")
            .field("text", &String::from_utf8_lossy(self.as_bytes()))
            .field("len", &self.len)
            .finish()
    }
}

/// Domain-specific application fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Counter driven by the increment/decrement/reset events.
    pub counter: i64,
    /// Bounded text input buffer.
    pub input: InputBuffer,
    /// Index of the currently selected item.
    pub selection: u32,
    /// Identifier of the most recently pressed button.
    pub last_button: u32,
}

/// Presentation hints consumed by the host shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiState {
    /// Screen currently presented.
    pub screen: Screen,
    /// Screen to return to on back navigation.
    pub previous_screen: Screen,
    /// Active tab index.
    pub tab: u32,
    /// Vertical scroll offset reported by the shell.
    pub scroll_offset: i32,
    /// Whether a loading indicator should be shown.
    pub loading: bool,
    /// Whether the app is in the foreground.
    pub foreground: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Home,
            previous_screen: Screen::Home,
            tab: 0,
            scroll_offset: 0,
            loading: false,
            foreground: true,
        }
    }
}

/// Mutable portion of the state: everything the diff engine compares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Model {
    pub app: AppState,
    pub ui: UiState,
}

impl Model {
    /// Creates a model using the default initializer.
    pub fn new() -> Self {
        Self::default()
    }
}
