pub mod error;
pub mod openai;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use openai::{OpenAi, Provider};
pub use traits::ChatModel;
pub use util::truncate_chars;
