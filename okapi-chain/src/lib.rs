//! Zerocoin data structures and canonical serialization for Okapi.
//!
//! This crate contains the consensus-critical value objects of the Okapi
//! zerocoin protocol: block heights, transaction identifiers, coin
//! denominations and parameter sets, public coins and mint records, the
//! per-denomination accumulators and their membership witnesses, and the
//! public-coin-spend proof.
//!
//! Stateful code that *uses* these values, like the incremental witness
//! engine and its background worker, lives in `okapi-witness`.

#![deny(missing_docs)]

mod sha256d_writer;

pub mod block;
pub mod serialization;
pub mod transaction;
pub mod zerocoin;
