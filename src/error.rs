// Custom errors surfaced by the tranched liquidity program

use num_derive::FromPrimitive;
use solana_program::{
  decode_error::DecodeError,
  msg,
  program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

// Errors returned by the program as `ProgramError::Custom(code)`.
//
// Discriminants are part of the wire contract with clients; never reorder.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum TrancheError {
  // A supplied account does not match its expected derivation or id
  #[error("Account does not match its expected address")]
  AccountMismatch = 0,
  // Missing payer signature, or the mint authority is not an approved delegate
  #[error("Missing or incorrect authority")]
  AuthorizationFailure = 1,
  // The depositor's token balance cannot cover the deposit
  #[error("Insufficient funds for deposit")]
  InsufficientFunds = 2,
  // No off-curve address was found in the bump search space
  #[error("Program address derivation exhausted")]
  DerivationExhausted = 3,
  #[error("Deposit amount must be greater than zero")]
  ZeroDepositAmount = 4,
  #[error("Reserve has not been initialized")]
  ReserveNotActive = 5,
  // Only one of the reserve account and the collateral mint exists
  #[error("Reserve is only partially initialized")]
  IncompleteReserve = 6,
  // Collateral supply would exceed the reserve balance
  #[error("Collateral supply exceeds reserve balance")]
  BackingViolation = 7,
  #[error("Math overflow")]
  MathOverflow = 8,
}

impl From<TrancheError> for ProgramError {
  fn from(e: TrancheError) -> Self {
    ProgramError::Custom(e as u32)
  }
}

impl<T> DecodeError<T> for TrancheError {
  fn type_of() -> &'static str {
    "TrancheError"
  }
}

impl PrintProgramError for TrancheError {
  fn print<E>(&self)
  where
    E: 'static + std::error::Error + DecodeError<E> + PrintProgramError + num_traits::FromPrimitive,
  {
    msg!("Error: {}", self);
  }
}
