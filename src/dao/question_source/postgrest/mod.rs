mod config;
mod error;
mod source;

pub use config::PostgrestConfig;
pub use error::{PostgrestError, PostgrestResult};
pub use source::PostgrestQuestionSource;
