// Program-derived addresses for reserves.
//
// Every address the program signs for is a pure function of the program id
// and the underlying mint, so the dispatcher can recompute and compare them
// instead of storing them.

use solana_program::pubkey::Pubkey;                         // PDA search and seed-based addresses

use crate::error::TrancheError;                             // DerivationExhausted when the bump search fails

// Seed prefix for the reserve token account.
pub const RESERVE_SEED: &[u8] = b"reserve";
// Seed prefix for the collateral mint.
pub const COLLATERAL_MINT_SEED: &[u8] = b"collateral-mint";
// Label prefix for the collateral mint authority (`collateral-auth-<asset>`).
pub const COLLATERAL_AUTHORITY_SEED: &[u8] = b"collateral-auth-";

// Bounded search for an off-curve address.
pub fn derive_address(program_id: &Pubkey, seeds: &[&[u8]]) -> Result<(Pubkey, u8), TrancheError> {
  Pubkey::try_find_program_address(seeds, program_id).ok_or(TrancheError::DerivationExhausted)
}

// Reserve token account for `underlying_mint`, keyed by the token program as well.
pub fn find_reserve_address(
  program_id: &Pubkey,
  underlying_mint: &Pubkey,
) -> Result<(Pubkey, u8), TrancheError> {
  derive_address(
    program_id,
    &[RESERVE_SEED, spl_token::id().as_ref(), underlying_mint.as_ref()],
  )
}

pub fn find_collateral_mint_address(
  program_id: &Pubkey,
  underlying_mint: &Pubkey,
) -> Result<(Pubkey, u8), TrancheError> {
  derive_address(program_id, &[COLLATERAL_MINT_SEED, underlying_mint.as_ref()])
}

// Mint authority of the collateral mint. Never has a private key.
pub fn find_mint_authority_address(
  program_id: &Pubkey,
  underlying_mint: &Pubkey,
) -> Result<(Pubkey, u8), TrancheError> {
  derive_address(program_id, &[COLLATERAL_AUTHORITY_SEED, underlying_mint.as_ref()])
}

// All derived addresses of one reserve, with the bumps needed to sign for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveAddresses {
  pub token_program: Pubkey,
  pub underlying_mint: Pubkey,
  pub reserve: Pubkey,
  pub reserve_bump: u8,
  pub collateral_mint: Pubkey,
  pub collateral_mint_bump: u8,
  pub mint_authority: Pubkey,
  pub mint_authority_bump: u8,
}

impl ReserveAddresses {
  pub fn derive(program_id: &Pubkey, underlying_mint: &Pubkey) -> Result<Self, TrancheError> {
    let (reserve, reserve_bump) = find_reserve_address(program_id, underlying_mint)?;
    let (collateral_mint, collateral_mint_bump) =
      find_collateral_mint_address(program_id, underlying_mint)?;
    let (mint_authority, mint_authority_bump) =
      find_mint_authority_address(program_id, underlying_mint)?;

    Ok(ReserveAddresses {
      token_program: spl_token::id(),
      underlying_mint: *underlying_mint,
      reserve,
      reserve_bump,
      collateral_mint,
      collateral_mint_bump,
      mint_authority,
      mint_authority_bump,
    })
  }

  pub fn reserve_seeds<'a>(&'a self, bump: &'a [u8; 1]) -> [&'a [u8]; 4] {
    [RESERVE_SEED, self.token_program.as_ref(), self.underlying_mint.as_ref(), bump]
  }

  pub fn collateral_mint_seeds<'a>(&'a self, bump: &'a [u8; 1]) -> [&'a [u8]; 3] {
    [COLLATERAL_MINT_SEED, self.underlying_mint.as_ref(), bump]
  }

  pub fn mint_authority_seeds<'a>(&'a self, bump: &'a [u8; 1]) -> [&'a [u8]; 3] {
    [COLLATERAL_AUTHORITY_SEED, self.underlying_mint.as_ref(), bump]
  }
}
