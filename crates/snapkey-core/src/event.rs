use rdev::Key;
use std::time::Instant;

/// Where a key event came from. Synthetic events are the replayer's own
/// output echoed back by the OS and must never re-enter the match path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    Physical,
    Synthetic,
}

/// Modifier state captured alongside a key-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

/// A single key-down as observed by the platform listener, before
/// classification. Transient; one per hook callback.
#[derive(Debug, Clone)]
pub struct RawKeyEvent {
    pub key: Key,
    /// Layout-resolved text for the key, when the OS provides one.
    pub text: Option<String>,
    pub modifiers: Modifiers,
    pub origin: EventOrigin,
    pub at: Instant,
}

impl RawKeyEvent {
    pub fn physical(key: Key, text: Option<String>, modifiers: Modifiers) -> Self {
        RawKeyEvent {
            key,
            text,
            modifiers,
            origin: EventOrigin::Physical,
            at: Instant::now(),
        }
    }
}

/// The interceptor's output: what a key-down means to the match engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalSignal {
    /// A typed character, including ' ', '\n' and '\t'.
    Char(char),
    /// Remove the last buffered character.
    Backspace,
    /// The editing context changed; discard everything accumulated.
    Reset,
}
