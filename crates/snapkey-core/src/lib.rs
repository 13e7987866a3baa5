pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod focus;
pub mod interceptor;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod replayer;
pub mod settings;
pub mod store;

// Re-export common items for convenience
pub use config::{get_config_dir, is_daemon_running};
pub use engine::MatchEngine;
pub use error::{Result, SnapkeyError};
pub use event::{EventOrigin, LogicalSignal, Modifiers, RawKeyEvent};
pub use focus::{FocusProbe, FocusWatcher, NullProbe};
pub use interceptor::Interceptor;
pub use models::{Category, ExpansionRequest, Snippet};
pub use output::{EnigoOutput, KeyOutput};
pub use pipeline::{Pipeline, PipelineHandle};
pub use replayer::Replayer;
pub use settings::Settings;
pub use store::{SnippetLookup, SnippetStore};
