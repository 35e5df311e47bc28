//! Output formatting and response generation.

mod response;

pub use response::{HookResponse, format_response};
