pub mod config;
pub mod error;
pub mod types;

pub use config::{
    load_config, ClassifierConfig, FileConfig, InputConfig, SearchConfig, Secrets,
    DEFAULT_KEYWORDS,
};
pub use error::{Result, ScreeningError};
pub use types::*;
