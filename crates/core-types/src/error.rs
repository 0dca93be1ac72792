use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Series '{series}' has a timestamp at index {index} earlier than the one before it")]
    InvalidSeries { series: String, index: usize },

    #[error("Series '{series}' has a non-finite value at index {index}")]
    NonFiniteValue { series: String, index: usize },
}
