pub mod history;
pub mod suggest;

pub use history::{predict, Prediction, CONFIDENCE_THRESHOLD, PREDICTION_WINDOW};
pub use suggest::{suggest, SuggestionSet, SuggestionTables};
