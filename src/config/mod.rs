pub mod client;
pub mod settings;

pub use client::{ClientConfig, Overrides};
pub use settings::Settings;
