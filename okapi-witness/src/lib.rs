//! The Okapi zerocoin witness engine.
//!
//! Every locally-owned mint is tracked by a [`CoinWitnessData`] record,
//! holding the coin's membership witness and how far up the chain it has
//! been advanced. The [`generate`] module advances a record towards a
//! target height by folding in the intervening mints of the same
//! denomination, jumping over long stale stretches via on-chain
//! accumulator checkpoints. Because each fold is a modular exponentiation,
//! the work runs on a dedicated background [`worker`] thread, off the
//! chain-processing path, with cooperative cancellation.
//!
//! Chain data is consumed through the read-only [`index`] traits; the
//! engine never writes chain state.

#![deny(missing_docs)]

mod config;

pub mod generate;
pub mod index;
pub mod witness;
pub mod worker;

pub use config::Config;

pub use witness::CoinWitnessData;
