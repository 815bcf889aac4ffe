//! Core library for the ThumbParams configuration editor.
//! Loads the OSC parameter config into a typed document, projects it into a flat parameter
//! table, applies single and bulk edits by parameter name, and writes it back preserving
//! everything the editor did not touch.

pub mod bulk;
pub mod error;
mod gui;
pub mod model;
pub mod project;
pub mod resolve;
pub mod session;
pub mod statics;
pub mod value;

pub use bulk::BulkOp;
pub use error::{DocumentError, EditError};
pub use gui::run_gui;
pub use model::Document;
pub use project::{ParameterRecord, project};
pub use resolve::{FlagKind, FlagValue, Slot};
pub use session::{EditEvent, LoadedConfig, Refresh};
pub use value::ConfigValue;
