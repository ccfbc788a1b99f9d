// The program keeps no data accounts of its own: a reserve's state is read
// straight out of the SPL token accounts it controls.

use solana_program::{
  account_info::AccountInfo,
  program_error::ProgramError,
  program_pack::{IsInitialized, Pack},
};
use spl_token::state::{Account as TokenAccount, Mint};

use crate::error::TrancheError;

// Lifecycle of a reserve. `Active` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveStatus {
  // Neither the reserve account nor the collateral mint exist yet
  Uninitialized,
  // Both exist and deposits are accepted
  Active,
}

impl ReserveStatus {
  // Detect the status from the reserve token account and collateral mint.
  //
  // The two are always created in the same instruction, so finding only one
  // of them initialized means the addresses were tampered with.
  pub fn detect(reserve: &AccountInfo, collateral_mint: &AccountInfo) -> Result<Self, ProgramError> {
    let reserve_ready = is_initialized_token_state::<TokenAccount>(reserve)?;
    let mint_ready = is_initialized_token_state::<Mint>(collateral_mint)?;

    match (reserve_ready, mint_ready) {
      (false, false) => Ok(ReserveStatus::Uninitialized),
      (true, true) => Ok(ReserveStatus::Active),
      _ => Err(TrancheError::IncompleteReserve.into()),
    }
  }
}

// An account the token program does not own counts as absent; one it owns
// must unpack cleanly.
fn is_initialized_token_state<T: Pack + IsInitialized>(info: &AccountInfo) -> Result<bool, ProgramError> {
  if info.owner != &spl_token::id() || info.data_len() != T::LEN {
    return Ok(false);
  }
  let state = T::unpack_unchecked(&info.try_borrow_data()?)?;
  Ok(state.is_initialized())
}

// The two quantities the deposit ledger tracks for one asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReserveSnapshot {
  // Underlying tokens held by the reserve account
  pub balance: u64,
  // Collateral tokens issued against the reserve
  pub collateral_supply: u64,
}

impl ReserveSnapshot {
  pub fn load(reserve: &AccountInfo, collateral_mint: &AccountInfo) -> Result<Self, ProgramError> {
    let reserve_account = TokenAccount::unpack(&reserve.try_borrow_data()?)?;
    let mint = Mint::unpack(&collateral_mint.try_borrow_data()?)?;

    Ok(ReserveSnapshot {
      balance: reserve_account.amount,
      collateral_supply: mint.supply,
    })
  }

  // Collateral never exceeds what the reserve holds.
  pub fn is_backed(&self) -> bool {
    self.collateral_supply <= self.balance
  }

  // Expected snapshot after a successful deposit of `amount`.
  pub fn after_deposit(&self, amount: u64) -> Result<Self, TrancheError> {
    Ok(ReserveSnapshot {
      balance: self.balance.checked_add(amount).ok_or(TrancheError::MathOverflow)?,
      collateral_supply: self
        .collateral_supply
        .checked_add(amount)
        .ok_or(TrancheError::MathOverflow)?,
    })
  }
}
