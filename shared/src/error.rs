use thiserror::Error;


#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
  #[error("Amount is required")]
  Missing,
  #[error("Amount must be greater than zero: {0}")]
  NotPositive(String),
  #[error("Amount is not a valid decimal number: {0}")]
  Malformed(String),
  #[error("Amount is too large")]
  Overflow,
}

pub type AmountResult<T> = Result<T, AmountError>;
