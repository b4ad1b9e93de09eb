pub mod date;
pub mod parser;

pub use date::{DateResolver, NaturalDateResolver};
pub use parser::InputParser;

use crate::core::draft::TaskDraft;

/// Parse quick-entry text into a draft.
pub fn parse(input: &str, resolver: &impl DateResolver) -> TaskDraft {
    InputParser::parse(input, resolver)
}
