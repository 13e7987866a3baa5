use crate::config::get_settings_file_path;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// User-tunable knobs for the expansion pipeline.
///
/// Read-only from the pipeline's point of view; may be swapped between
/// expansions but never mutated mid-replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Delimiter key toggles. Space and newline are always hard resets and
    // are deliberately absent here.
    pub use_tab_as_delimiter: bool,
    pub use_period_as_delimiter: bool,
    pub use_comma_as_delimiter: bool,
    pub use_semicolon_as_delimiter: bool,
    pub use_backtick_as_delimiter: bool,
    pub use_single_quote_as_delimiter: bool,
    pub use_slash_as_delimiter: bool,

    /// Delay between synthetic backspaces. Slow-rendering targets drop
    /// deletions that arrive in a burst.
    pub backspace_delay_ms: u64,

    /// Delay between synthetic replacement characters.
    pub char_delay_ms: u64,

    /// Minimum interval between processed input signals. 0 disables the
    /// throttle; useful on low-spec machines.
    pub key_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            use_tab_as_delimiter: true,
            use_period_as_delimiter: true,
            use_comma_as_delimiter: true,
            use_semicolon_as_delimiter: true,
            use_backtick_as_delimiter: true,
            use_single_quote_as_delimiter: true,
            use_slash_as_delimiter: true,
            backspace_delay_ms: 10,
            char_delay_ms: 5,
            key_interval_ms: 0,
        }
    }
}

impl Settings {
    /// Whether `ch` is an active match-trigger delimiter.
    pub fn is_delimiter(&self, ch: char) -> bool {
        match ch {
            '\t' => self.use_tab_as_delimiter,
            '.' => self.use_period_as_delimiter,
            ',' => self.use_comma_as_delimiter,
            ';' => self.use_semicolon_as_delimiter,
            '`' => self.use_backtick_as_delimiter,
            '\'' => self.use_single_quote_as_delimiter,
            '/' => self.use_slash_as_delimiter,
            _ => false,
        }
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or empty.
    pub fn load_from(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_json::from_str(&content).map_err(|e| e.into())
    }

    /// Load settings from the default location.
    pub fn load() -> Result<Settings> {
        Settings::load_from(&get_settings_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_settings_file_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delimiters_are_all_enabled() {
        let settings = Settings::default();
        for ch in ['\t', '.', ',', ';', '`', '\'', '/'] {
            assert!(settings.is_delimiter(ch), "{:?} should be a delimiter", ch);
        }
    }

    #[test]
    fn space_and_newline_are_never_delimiters() {
        let settings = Settings::default();
        assert!(!settings.is_delimiter(' '));
        assert!(!settings.is_delimiter('\n'));
    }

    #[test]
    fn disabled_delimiter_is_not_matched() {
        let settings = Settings {
            use_period_as_delimiter: false,
            ..Settings::default()
        };
        assert!(!settings.is_delimiter('.'));
        assert!(settings.is_delimiter(','));
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            use_slash_as_delimiter: false,
            backspace_delay_ms: 25,
            key_interval_ms: 8,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }
}
