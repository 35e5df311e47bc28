//! Shell command parsing.

mod splitter;
mod tokenizer;

pub use splitter::{CommandSegment, Operator, split_commands};
pub use tokenizer::{Token, command_name, tokenize, words};
