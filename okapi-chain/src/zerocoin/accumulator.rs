//! Per-denomination accumulators and membership witnesses.
//!
//! An accumulator is a single value in an unknown-order group representing
//! every coin of one denomination minted so far. Folding a coin in raises
//! the accumulator to the coin's commitment: because exponent multiplication
//! commutes, the final value does not depend on the order coins are folded
//! in, which is the property the incremental witness-update design relies
//! on. Accumulators are append-only; no operation removes a member.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zerocoin::{Denomination, Params, ParamsVersion, PublicCoin};

/// An error describing why an accumulator operation was refused.
///
/// These conditions never occur under correct operation; each one guards a
/// consistency rule that would silently corrupt a witness if violated.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum AccumulatorError {
    /// The coin and the accumulator use different parameter sets.
    #[error("coin parameter set {coin:?} does not match accumulator parameter set {accumulator:?}")]
    VersionMismatch {
        /// The accumulator's parameter set.
        accumulator: ParamsVersion,
        /// The coin's parameter set.
        coin: ParamsVersion,
    },

    /// The coin and the accumulator have different denominations.
    #[error("coin denomination {coin} does not match accumulator denomination {accumulator}")]
    DenominationMismatch {
        /// The accumulator's denomination.
        accumulator: Denomination,
        /// The coin's denomination.
        coin: Denomination,
    },

    /// A witness was asked to fold in the very coin it proves membership of.
    #[error("a witness must never accumulate its own coin")]
    SelfAccumulation,
}

/// The aggregate of all folded coin commitments for one denomination.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Accumulator {
    version: ParamsVersion,
    denomination: Denomination,
    value: BigUint,
}

impl Accumulator {
    /// Creates an empty accumulator holding the parameter set's base value.
    pub fn new(params: &Params, denomination: Denomination) -> Self {
        Accumulator {
            version: params.version(),
            denomination,
            value: params.accumulator_base().clone(),
        }
    }

    /// Recreates an accumulator from a previously stored value, such as an
    /// on-chain checkpoint.
    pub fn restore(version: ParamsVersion, denomination: Denomination, value: BigUint) -> Self {
        Accumulator {
            version,
            denomination,
            value,
        }
    }

    /// Folds one coin's public commitment into the aggregate.
    ///
    /// Folding is commutative across distinct coins and can never be undone.
    pub fn accumulate(&mut self, coin: &PublicCoin) -> Result<(), AccumulatorError> {
        if coin.version() != self.version {
            return Err(AccumulatorError::VersionMismatch {
                accumulator: self.version,
                coin: coin.version(),
            });
        }
        if coin.denomination() != self.denomination {
            return Err(AccumulatorError::DenominationMismatch {
                accumulator: self.denomination,
                coin: coin.denomination(),
            });
        }

        let params = Params::for_version(self.version);
        self.value = self.value.modpow(coin.commitment(), params.modulus());
        Ok(())
    }

    /// The parameter set this accumulator was built under.
    pub fn version(&self) -> ParamsVersion {
        self.version
    }

    /// The denomination this accumulator aggregates.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// The current aggregate value.
    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

/// Membership proof material for one coin.
///
/// A witness is the accumulator of every coin *except* the one it proves:
/// raising the witness to the coin's commitment must land exactly on the
/// full accumulator. A witness is bound to the accumulator state it was
/// advanced to; as the accumulator grows, the witness must be advanced by
/// folding in the same coins.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorWitness {
    witness: Accumulator,
    coin: PublicCoin,
}

impl AccumulatorWitness {
    /// Creates a witness for `coin`, starting from an accumulator state that
    /// does not contain the coin (an empty accumulator, or a checkpoint
    /// below the coin's mint height).
    pub fn new(checkpoint: Accumulator, coin: PublicCoin) -> Self {
        AccumulatorWitness {
            witness: checkpoint,
            coin,
        }
    }

    /// Folds another coin of the same denomination into the witness.
    ///
    /// The tracked coin itself must never be folded in; doing so would
    /// produce a witness that can never verify.
    pub fn fold(&mut self, other: &PublicCoin) -> Result<(), AccumulatorError> {
        if other == &self.coin {
            return Err(AccumulatorError::SelfAccumulation);
        }
        self.witness.accumulate(other)
    }

    /// Checks that the tracked coin is a member of `accumulator`.
    ///
    /// Returns false for any mismatch: wrong parameter set, wrong
    /// denomination, a stale witness, or a witness built for another coin.
    pub fn verify(&self, accumulator: &Accumulator) -> bool {
        if self.witness.version() != accumulator.version()
            || self.witness.denomination() != accumulator.denomination()
        {
            return false;
        }

        let params = Params::for_version(accumulator.version());
        let recovered = self
            .witness
            .value()
            .modpow(self.coin.commitment(), params.modulus());

        recovered == *accumulator.value()
    }

    /// The coin this witness proves membership of.
    pub fn coin(&self) -> &PublicCoin {
        &self.coin
    }

    /// The current witness value.
    pub fn value(&self) -> &BigUint {
        self.witness.value()
    }
}
