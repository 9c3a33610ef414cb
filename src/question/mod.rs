pub mod bank;
pub mod loader;
pub mod types;

pub use bank::QuestionBank;
pub use types::{Question, QuestionKind};
