mod settings;

pub use settings::{DatabaseSettings, Settings};
