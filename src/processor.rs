// Core Solana modules for handling programs and accounts
use solana_program::{
  account_info::{next_account_info, AccountInfo},         // Tools to iterate and manage accounts
  entrypoint::ProgramResult,                              // Type for Result<(), ProgramError>
  msg,                                                    // Logging macro for debugging
  program_pack::Pack,
  pubkey::Pubkey,                                         // Public key type used for account IDs
  system_program,
  sysvar::{self, rent::Rent, Sysvar},                     // Rent system variable for rent-exempt funding
};

// SPL Token account state, used to inspect the depositor's accounts
use spl_token::state::Account as TokenAccount;

use crate::error::TrancheError;
use crate::instruction::TrancheInstruction;               // Opcode + payload decoded from instruction data
use crate::ledger::{self, DepositAccounts, InitializeReserveAccounts};
use crate::registry::ReserveAddresses;                    // Expected PDAs for an underlying mint
use crate::state::{ReserveSnapshot, ReserveStatus};

// Main entry point for the program's logic
pub fn process_instruction(
  program_id: &Pubkey,                                  // The public key of this program
  accounts: &[AccountInfo],                             // Accounts passed into the transaction
  instruction_data: &[u8],                              // Raw instruction data, opcode first
) -> ProgramResult {
  msg!(
    "process_instruction: {}: {} accounts, data={:?}",
    program_id,
    accounts.len(),
    instruction_data
  );

  let instruction = TrancheInstruction::unpack(instruction_data)?;

  // Dispatch logic based on which instruction was sent
  match instruction {
    TrancheInstruction::InitializeReserve => {
      msg!("Instruction: InitializeReserve");
      initialize_reserve(program_id, accounts)
    }
    TrancheInstruction::Deposit { amount } => {
      msg!("Instruction: Deposit");
      deposit(program_id, accounts, amount)
    }
  }
}

fn initialize_reserve(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
  let account_info_iter = &mut accounts.iter();

  // Account 0: The underlying SPL token mint accepted into the reserve
  let underlying_mint_info = next_account_info(account_info_iter)?;
  // Account 1: The reserve token account (PDA)
  let reserve_info = next_account_info(account_info_iter)?;
  // Account 2: The system program, used to allocate the PDAs
  let system_program_info = next_account_info(account_info_iter)?;
  // Account 3: The payer funding rent, must sign
  let payer_info = next_account_info(account_info_iter)?;
  // Account 4: The SPL Token program
  let token_program_info = next_account_info(account_info_iter)?;
  // Account 5: Rent sysvar
  let rent_sysvar_info = next_account_info(account_info_iter)?;
  // Account 6: The collateral mint (PDA)
  let collateral_mint_info = next_account_info(account_info_iter)?;
  // Account 7: The collateral mint authority (PDA)
  let mint_authority_info = next_account_info(account_info_iter)?;

  if !payer_info.is_signer {
    msg!("Error: payer signature missing");
    return Err(TrancheError::AuthorizationFailure.into());
  }

  expect_key(system_program_info, &system_program::id(), "system program")?;
  expect_key(token_program_info, &spl_token::id(), "token program")?;
  expect_key(rent_sysvar_info, &sysvar::rent::id(), "rent sysvar")?;
  if underlying_mint_info.owner != &spl_token::id() {
    msg!("Error: underlying mint {} is not a token mint", underlying_mint_info.key);
    return Err(TrancheError::AccountMismatch.into());
  }

  let addresses = ReserveAddresses::derive(program_id, underlying_mint_info.key)?;
  expect_key(reserve_info, &addresses.reserve, "reserve")?;
  expect_key(collateral_mint_info, &addresses.collateral_mint, "collateral mint")?;
  expect_key(mint_authority_info, &addresses.mint_authority, "mint authority")?;

  if ReserveStatus::detect(reserve_info, collateral_mint_info)? == ReserveStatus::Active {
    msg!("Reserve {} already active", reserve_info.key);
    return Ok(());
  }

  let rent = Rent::from_account_info(rent_sysvar_info)?;
  ledger::initialize_reserve(
    &addresses,
    &InitializeReserveAccounts {
      underlying_mint: underlying_mint_info,
      reserve: reserve_info,
      collateral_mint: collateral_mint_info,
      payer: payer_info,
      system_program: system_program_info,
      token_program: token_program_info,
    },
    &rent,
  )?;

  msg!(
    "Reserve {} active for mint {}, collateral mint {}",
    reserve_info.key,
    underlying_mint_info.key,
    collateral_mint_info.key
  );
  Ok(())
}

fn deposit(program_id: &Pubkey, accounts: &[AccountInfo], requested: Option<u64>) -> ProgramResult {
  let account_info_iter = &mut accounts.iter();

  // Account 0: Depositor's underlying token account, delegated to the mint authority
  let source_info = next_account_info(account_info_iter)?;
  // Account 1: The reserve token account (PDA)
  let reserve_info = next_account_info(account_info_iter)?;
  // Account 2: The collateral mint authority (PDA), signs through seeds
  let mint_authority_info = next_account_info(account_info_iter)?;
  // Account 3: The collateral mint (PDA)
  let collateral_mint_info = next_account_info(account_info_iter)?;
  // Account 4: The SPL Token program
  let token_program_info = next_account_info(account_info_iter)?;
  // Account 5: Rent sysvar
  let rent_sysvar_info = next_account_info(account_info_iter)?;
  // Account 6: Depositor's collateral token account
  let collateral_destination_info = next_account_info(account_info_iter)?;

  expect_key(token_program_info, &spl_token::id(), "token program")?;
  expect_key(rent_sysvar_info, &sysvar::rent::id(), "rent sysvar")?;

  let source = load_token_account(source_info, "source")?;
  let addresses = ReserveAddresses::derive(program_id, &source.mint)?;
  expect_key(reserve_info, &addresses.reserve, "reserve")?;
  expect_key(mint_authority_info, &addresses.mint_authority, "mint authority")?;
  expect_key(collateral_mint_info, &addresses.collateral_mint, "collateral mint")?;

  if ReserveStatus::detect(reserve_info, collateral_mint_info)? != ReserveStatus::Active {
    msg!("Error: reserve {} is not initialized", reserve_info.key);
    return Err(TrancheError::ReserveNotActive.into());
  }

  let destination = load_token_account(collateral_destination_info, "collateral destination")?;
  if destination.mint != addresses.collateral_mint {
    msg!("Error: collateral destination holds mint {}", destination.mint);
    return Err(TrancheError::AccountMismatch.into());
  }
  // Collateral goes back to whoever owns the source tokens, never to the caller's pick
  if destination.owner != source.owner {
    msg!(
      "Error: collateral destination owned by {}, source owned by {}",
      destination.owner,
      source.owner
    );
    return Err(TrancheError::AccountMismatch.into());
  }

  let amount = ledger::resolve_deposit_amount(&source, &addresses.mint_authority, requested)?;
  let expected = ReserveSnapshot::load(reserve_info, collateral_mint_info)?.after_deposit(amount)?;

  ledger::record_deposit(
    &addresses,
    &DepositAccounts {
      source: source_info,
      reserve: reserve_info,
      mint_authority: mint_authority_info,
      collateral_mint: collateral_mint_info,
      collateral_destination: collateral_destination_info,
      token_program: token_program_info,
    },
    amount,
  )?;

  let snapshot = ReserveSnapshot::load(reserve_info, collateral_mint_info)?;
  if snapshot != expected || !snapshot.is_backed() {
    msg!(
      "Error: reserve holds {} against {} collateral",
      snapshot.balance,
      snapshot.collateral_supply
    );
    return Err(TrancheError::BackingViolation.into());
  }

  msg!(
    "Deposited {}: reserve balance {}, collateral supply {}",
    amount,
    snapshot.balance,
    snapshot.collateral_supply
  );
  Ok(())
}

// Byte-for-byte comparison against the expected address.
fn expect_key(info: &AccountInfo, expected: &Pubkey, name: &str) -> ProgramResult {
  if info.key != expected {
    msg!("Error: {} address mismatch, expected {} got {}", name, expected, info.key);
    return Err(TrancheError::AccountMismatch.into());
  }
  Ok(())
}

fn load_token_account(info: &AccountInfo, name: &str) -> Result<TokenAccount, TrancheError> {
  if info.owner != &spl_token::id() {
    msg!("Error: {} {} is not a token account", name, info.key);
    return Err(TrancheError::AccountMismatch);
  }
  let data = info.try_borrow_data().map_err(|_| TrancheError::AccountMismatch)?;
  TokenAccount::unpack(&data).map_err(|_| {
    msg!("Error: {} {} is not an initialized token account", name, info.key);
    TrancheError::AccountMismatch
  })
}
