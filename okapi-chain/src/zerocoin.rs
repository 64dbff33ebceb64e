//! Zerocoin protocol value objects.
//!
//! Each coin denomination has its own independent accumulator: an aggregate
//! value representing every coin of that denomination minted so far. A coin
//! proves membership in its accumulator with a witness, without revealing
//! which coin it is. The public-coin-spend path is a lighter alternative
//! that reveals the coin's serial number instead.

mod accumulator;
mod coin;
mod denomination;
mod params;
mod spend;

pub use accumulator::{Accumulator, AccumulatorError, AccumulatorWitness};
pub use coin::{PublicCoin, ZerocoinMint, PUBKEY_COIN_VERSION, V1_COIN_VERSION};
pub use denomination::Denomination;
pub use params::{Params, ParamsVersion};
pub use spend::{PublicCoinSpend, SpendError, SpendType};

#[cfg(test)]
mod tests;
