// Deposit ledger operations.
//
// Balances live in SPL token accounts; these functions move them through
// cross-program invocations. Each one runs inside a single instruction, so
// the runtime commits all of its CPIs or none of them.

use solana_program::{
  account_info::AccountInfo,                              // Accounts handed through to the CPIs
  entrypoint::ProgramResult,
  msg,
  program::{invoke, invoke_signed},                       // CPIs; signed ones carry PDA seeds
  program_option::COption,
  program_pack::Pack,                                     // Unpack token state and read LEN
  pubkey::Pubkey,
  rent::Rent,                                             // Rent-exempt minimum for new accounts
  system_instruction,                                     // create_account / allocate / assign
};
use spl_token::state::{Account as TokenAccount, Mint};    // SPL token account and mint layouts

use crate::{error::TrancheError, registry::ReserveAddresses};

// Accounts touched by `initialize_reserve`.
pub struct InitializeReserveAccounts<'a, 'info> {
  pub underlying_mint: &'a AccountInfo<'info>,
  pub reserve: &'a AccountInfo<'info>,
  pub collateral_mint: &'a AccountInfo<'info>,
  pub payer: &'a AccountInfo<'info>,
  pub system_program: &'a AccountInfo<'info>,
  pub token_program: &'a AccountInfo<'info>,
}

// Accounts touched by `record_deposit`.
pub struct DepositAccounts<'a, 'info> {
  pub source: &'a AccountInfo<'info>,
  pub reserve: &'a AccountInfo<'info>,
  pub mint_authority: &'a AccountInfo<'info>,
  pub collateral_mint: &'a AccountInfo<'info>,
  pub collateral_destination: &'a AccountInfo<'info>,
  pub token_program: &'a AccountInfo<'info>,
}

// Create the reserve token account and the collateral mint at their PDAs.
//
// The reserve owns itself; the collateral mint copies the underlying decimals
// and has the mint authority PDA as its only minter.
pub fn initialize_reserve(
  addresses: &ReserveAddresses,
  accounts: &InitializeReserveAccounts,
  rent: &Rent,
) -> ProgramResult {
  let underlying = Mint::unpack(&accounts.underlying_mint.try_borrow_data()?)?;

  msg!("Creating reserve token account {}", accounts.reserve.key);
  let bump = [addresses.reserve_bump];
  create_pda_account(
    accounts.payer,
    accounts.reserve,
    accounts.system_program,
    rent,
    TokenAccount::LEN,
    &addresses.reserve_seeds(&bump),
  )?;
  invoke(
    &spl_token::instruction::initialize_account3(
      &spl_token::id(),
      accounts.reserve.key,
      accounts.underlying_mint.key,
      accounts.reserve.key, // token owner is the reserve address itself
    )?,
    &[
      accounts.reserve.clone(),
      accounts.underlying_mint.clone(),
      accounts.token_program.clone(),
    ],
  )?;

  msg!("Creating collateral mint {}", accounts.collateral_mint.key);
  let bump = [addresses.collateral_mint_bump];
  create_pda_account(
    accounts.payer,
    accounts.collateral_mint,
    accounts.system_program,
    rent,
    Mint::LEN,
    &addresses.collateral_mint_seeds(&bump),
  )?;
  invoke(
    &spl_token::instruction::initialize_mint2(
      &spl_token::id(),
      accounts.collateral_mint.key,
      &addresses.mint_authority,
      None,
      underlying.decimals,
    )?,
    &[accounts.collateral_mint.clone(), accounts.token_program.clone()],
  )
}

// Resolve how much a depositor may move, checking balance and approval.
//
// `requested == None` takes the whole allowance granted to the mint authority.
pub fn resolve_deposit_amount(
  source: &TokenAccount,
  mint_authority: &Pubkey,
  requested: Option<u64>,
) -> Result<u64, TrancheError> {
  if requested == Some(0) {
    return Err(TrancheError::ZeroDepositAmount);
  }
  if source.delegate != COption::Some(*mint_authority) {
    msg!("Error: mint authority is not an approved delegate of the source account");
    return Err(TrancheError::AuthorizationFailure);
  }

  let amount = requested.unwrap_or(source.delegated_amount);
  if amount == 0 {
    return Err(TrancheError::ZeroDepositAmount);
  }
  if source.amount < amount {
    msg!("Error: source holds {} but deposit is {}", source.amount, amount);
    return Err(TrancheError::InsufficientFunds);
  }
  if source.delegated_amount < amount {
    msg!("Error: approved {} but deposit is {}", source.delegated_amount, amount);
    return Err(TrancheError::AuthorizationFailure);
  }
  Ok(amount)
}

// Move `amount` underlying into the reserve and mint `amount` collateral.
pub fn record_deposit(
  addresses: &ReserveAddresses,
  accounts: &DepositAccounts,
  amount: u64,
) -> ProgramResult {
  let bump = [addresses.mint_authority_bump];
  let authority_seeds = addresses.mint_authority_seeds(&bump);

  msg!("Transferring {} into reserve {}", amount, accounts.reserve.key);
  invoke_signed(
    &spl_token::instruction::transfer(
      &spl_token::id(),
      accounts.source.key,
      accounts.reserve.key,
      accounts.mint_authority.key, // acts as the depositor's delegate
      &[],
      amount,
    )?,
    &[
      accounts.source.clone(),
      accounts.reserve.clone(),
      accounts.mint_authority.clone(),
      accounts.token_program.clone(),
    ],
    &[&authority_seeds[..]],
  )?;

  msg!("Minting {} collateral to {}", amount, accounts.collateral_destination.key);
  invoke_signed(
    &spl_token::instruction::mint_to(
      &spl_token::id(),
      accounts.collateral_mint.key,
      accounts.collateral_destination.key,
      accounts.mint_authority.key,
      &[],
      amount,
    )?,
    &[
      accounts.collateral_mint.clone(),
      accounts.collateral_destination.clone(),
      accounts.mint_authority.clone(),
      accounts.token_program.clone(),
    ],
    &[&authority_seeds[..]],
  )
}

// Allocates a token-program-owned account at a PDA. Lamports already sitting
// at the address are topped up instead, since `create_account` refuses
// funded addresses.
fn create_pda_account<'info>(
  payer: &AccountInfo<'info>,
  new_account: &AccountInfo<'info>,
  system_program: &AccountInfo<'info>,
  rent: &Rent,
  space: usize,
  signer_seeds: &[&[u8]],
) -> ProgramResult {
  let required_lamports = rent.minimum_balance(space).max(1);

  if new_account.lamports() == 0 {
    return invoke_signed(
      &system_instruction::create_account(
        payer.key,
        new_account.key,
        required_lamports,
        space as u64,
        &spl_token::id(),
      ),
      &[payer.clone(), new_account.clone(), system_program.clone()],
      &[signer_seeds],
    );
  }

  let top_up = required_lamports.saturating_sub(new_account.lamports());
  if top_up > 0 {
    invoke(
      &system_instruction::transfer(payer.key, new_account.key, top_up),
      &[payer.clone(), new_account.clone(), system_program.clone()],
    )?;
  }
  invoke_signed(
    &system_instruction::allocate(new_account.key, space as u64),
    &[new_account.clone(), system_program.clone()],
    &[signer_seeds],
  )?;
  invoke_signed(
    &system_instruction::assign(new_account.key, &spl_token::id()),
    &[new_account.clone(), system_program.clone()],
    &[signer_seeds],
  )
}
