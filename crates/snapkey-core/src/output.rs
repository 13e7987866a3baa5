use crate::error::{Result, SnapkeyError};
use enigo::{Direction, Enigo, Key, Keyboard, Settings as EnigoSettings};

/// The synthetic key sink the replayer writes through. Split out so the
/// replay protocol can be exercised without touching the OS.
pub trait KeyOutput: Send {
    fn backspace(&mut self) -> Result<()>;
    fn newline(&mut self) -> Result<()>;
    fn tab(&mut self) -> Result<()>;
    /// Send one character as a synthetic Unicode key event.
    fn unicode_char(&mut self, ch: char) -> Result<()>;
}

/// Production sink backed by enigo.
pub struct EnigoOutput {
    enigo: Enigo,
}

impl EnigoOutput {
    /// Failure here is fatal for the whole feature and must surface at
    /// startup.
    pub fn new() -> Result<Self> {
        let settings = EnigoSettings::default();
        match Enigo::new(&settings) {
            Ok(enigo) => Ok(EnigoOutput { enigo }),
            Err(err) => Err(SnapkeyError::Injection(format!(
                "Failed to create keyboard controller: {}",
                err
            ))),
        }
    }

    fn tap(&mut self, key: Key, what: &str) -> Result<()> {
        self.enigo
            .key(key, Direction::Click)
            .map_err(|err| SnapkeyError::Injection(format!("Failed to send {}: {}", what, err)))
    }
}

impl KeyOutput for EnigoOutput {
    fn backspace(&mut self) -> Result<()> {
        self.tap(Key::Backspace, "backspace")
    }

    fn newline(&mut self) -> Result<()> {
        self.tap(Key::Return, "newline")
    }

    fn tab(&mut self) -> Result<()> {
        self.tap(Key::Tab, "tab")
    }

    fn unicode_char(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.enigo
            .text(ch.encode_utf8(&mut buf))
            .map_err(|err| SnapkeyError::Injection(format!("Failed to type text: {}", err)))
    }
}
