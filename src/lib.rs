// Import essential types and modules from the Solana runtime

use solana_program::{
  account_info::AccountInfo,              // Represents an account's metadata (key, owner, data, etc.)
  declare_id,
  entrypoint::ProgramResult,              // Standard return type for Solana program functions
  program_error::PrintProgramError,
  pubkey::Pubkey,                         // Public key type used across Solana
};

// Declare separate modules for organization and maintainability

pub mod error;                                  // Custom error codes
pub mod instruction;                            // Wire format and instruction builders
pub mod ledger;                                 // Token movements backing each reserve
pub mod processor;                              // Validates accounts and dispatches instructions
pub mod registry;                               // Program-derived addresses
pub mod state;                                  // Reserve status read from token accounts

use error::TrancheError;

declare_id!("8qZTCZvR1iJR7NBvNQSsa4dG1CsYwK3GUjxaqTocfNyn");

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction_entry);      // Define the program's entry point

// The actual entry function that gets called when a transaction is sent to the program

pub fn process_instruction_entry(
  program_id: &Pubkey,                                                  // The program ID that owns this execution context
  accounts: &[AccountInfo],                                             // Array of accounts involved in the transaction
  instruction_data: &[u8],                                              // Opcode byte followed by opcode-specific data
) -> ProgramResult {

  // Delegate the real processing work, printing custom errors on the way out
  if let Err(error) = processor::process_instruction(program_id, accounts, instruction_data) {
    error.print::<TrancheError>();
    return Err(error);
  }
  Ok(())
}
