//! Configuration and dependency wiring.

mod dependencies;
mod settings;

pub use dependencies::{Dependencies, Runner};
pub use settings::Settings;
