use arrayref::array_ref;
use solana_program::{
  instruction::{AccountMeta, Instruction},          // For building instructions to send to the program
  program_error::ProgramError,
  pubkey::Pubkey,
  system_program, sysvar,
};

use crate::registry::ReserveAddresses;

// Instructions understood by the tranched liquidity program
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrancheInstruction {
  // Create the reserve token account and collateral mint for an underlying asset.
  // A no-op when the reserve is already active.
  //
  // Accounts:
  // 0. `[]` The underlying token mint
  // 1. `[writable]` The reserve token account (PDA)
  // 2. `[]` System program
  // 3. `[signer, writable]` Payer funding rent
  // 4. `[]` Token program
  // 5. `[]` Rent sysvar
  // 6. `[writable]` The collateral mint (PDA)
  // 7. `[]` The collateral mint authority (PDA)
  InitializeReserve,

  // Move underlying tokens into the reserve and mint the same amount of collateral.
  // The depositor must have approved the mint authority PDA as delegate beforehand.
  //
  // Accounts:
  // 0. `[writable]` Depositor's underlying token account
  // 1. `[writable]` The reserve token account (PDA)
  // 2. `[]` The collateral mint authority (PDA, signs through program seeds)
  // 3. `[writable]` The collateral mint (PDA)
  // 4. `[]` Token program
  // 5. `[]` Rent sysvar
  // 6. `[writable]` Depositor's collateral token account
  Deposit {
    // Explicit amount; `None` deposits the whole delegated allowance
    amount: Option<u64>,
  },
}

impl TrancheInstruction {
  // Unpack a byte buffer into a TrancheInstruction.
  pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
    let (&tag, rest) = input.split_first().ok_or(ProgramError::InvalidInstructionData)?;   // leading byte is the opcode
    Ok(match tag {
      0 => TrancheInstruction::InitializeReserve,
      1 => {
        let amount = match rest.len() {
          0 => None,
          8 => Some(u64::from_le_bytes(*array_ref![rest, 0, 8])),
          _ => return Err(ProgramError::InvalidInstructionData),
        };
        TrancheInstruction::Deposit { amount }
      }
      _ => return Err(ProgramError::InvalidInstructionData),
    })
  }

  // Pack a TrancheInstruction into its wire bytes.
  pub fn pack(&self) -> Vec<u8> {
    let mut buf = Vec::with_capacity(9);
    match self {
      TrancheInstruction::InitializeReserve => buf.push(0),
      TrancheInstruction::Deposit { amount } => {
        buf.push(1);
        if let Some(amount) = amount {
          buf.extend_from_slice(&amount.to_le_bytes());
        }
      }
    }
    buf
  }
}

// Build an `InitializeReserve` instruction.
pub fn initialize_reserve(
  program_id: &Pubkey,
  payer: &Pubkey,
  underlying_mint: &Pubkey,
) -> Result<Instruction, ProgramError> {
  let addresses = ReserveAddresses::derive(program_id, underlying_mint)?;

  Ok(Instruction {
    program_id: *program_id,
    accounts: vec![
      AccountMeta::new_readonly(*underlying_mint, false),
      AccountMeta::new(addresses.reserve, false),
      AccountMeta::new_readonly(system_program::id(), false),
      AccountMeta::new(*payer, true),
      AccountMeta::new_readonly(spl_token::id(), false),
      AccountMeta::new_readonly(sysvar::rent::id(), false),
      AccountMeta::new(addresses.collateral_mint, false),
      AccountMeta::new_readonly(addresses.mint_authority, false),
    ],
    data: TrancheInstruction::InitializeReserve.pack(),
  })
}

// Build a `Deposit` instruction.
pub fn deposit(
  program_id: &Pubkey,
  depositor_token_account: &Pubkey,
  depositor_collateral_account: &Pubkey,
  underlying_mint: &Pubkey,
  amount: Option<u64>,
) -> Result<Instruction, ProgramError> {
  let addresses = ReserveAddresses::derive(program_id, underlying_mint)?;

  Ok(Instruction {
    program_id: *program_id,
    accounts: vec![
      AccountMeta::new(*depositor_token_account, false),
      AccountMeta::new(addresses.reserve, false),
      AccountMeta::new_readonly(addresses.mint_authority, false),    // signed by the program, never by the client
      AccountMeta::new(addresses.collateral_mint, false),
      AccountMeta::new_readonly(spl_token::id(), false),
      AccountMeta::new_readonly(sysvar::rent::id(), false),
      AccountMeta::new(*depositor_collateral_account, false),
    ],
    data: TrancheInstruction::Deposit { amount }.pack(),
  })
}
