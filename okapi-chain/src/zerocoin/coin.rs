//! Public coins and wallet mint records.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{
    block::Height,
    transaction,
    zerocoin::{Denomination, ParamsVersion},
};

/// The version of coins minted under the legacy v1 parameter set.
pub const V1_COIN_VERSION: u8 = 1;

/// The version of coins whose serial number commits to a one-time public
/// key, enabling the public-coin-spend path.
pub const PUBKEY_COIN_VERSION: u8 = 2;

/// The public half of a zerocoin: a denomination and a commitment value.
///
/// The commitment hides the coin's serial number and randomness; revealing
/// those openings is what a spend does.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PublicCoin {
    denomination: Denomination,
    version: ParamsVersion,
    commitment: BigUint,
}

impl PublicCoin {
    /// Creates a public coin from its commitment value.
    pub fn new(denomination: Denomination, version: ParamsVersion, commitment: BigUint) -> Self {
        PublicCoin {
            denomination,
            version,
            commitment,
        }
    }

    /// The denomination of this coin.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// The parameter set this coin was minted under.
    pub fn version(&self) -> ParamsVersion {
        self.version
    }

    /// The coin's public commitment value.
    pub fn commitment(&self) -> &BigUint {
        &self.commitment
    }
}

/// A wallet record for one minted zerocoin.
///
/// Mint records are wallet storage, not consensus data, so they serialize
/// with Serde rather than the canonical wire format.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ZerocoinMint {
    denomination: Denomination,
    commitment: BigUint,
    serial_number: BigUint,
    randomness: BigUint,
    txid: transaction::Hash,
    output_index: u32,
    height: Option<Height>,
    version: u8,
}

impl ZerocoinMint {
    /// Creates a mint record for a coin that has been committed to the chain.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        denomination: Denomination,
        commitment: BigUint,
        serial_number: BigUint,
        randomness: BigUint,
        txid: transaction::Hash,
        output_index: u32,
        height: Option<Height>,
        version: u8,
    ) -> Self {
        ZerocoinMint {
            denomination,
            commitment,
            serial_number,
            randomness,
            txid,
            output_index,
            height,
            version,
        }
    }

    /// The denomination of the minted coin.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// The public coin this mint record tracks.
    pub fn public_coin(&self) -> PublicCoin {
        PublicCoin::new(
            self.denomination,
            self.params_version(),
            self.commitment.clone(),
        )
    }

    /// The serial number committed to at mint time, revealed at spend time.
    pub fn serial_number(&self) -> &BigUint {
        &self.serial_number
    }

    /// The commitment randomness, revealed by a public spend.
    pub fn randomness(&self) -> &BigUint {
        &self.randomness
    }

    /// The hash of the transaction that minted this coin.
    pub fn txid(&self) -> transaction::Hash {
        self.txid
    }

    /// The index of the mint output inside the minting transaction.
    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    /// The height at which the mint was included in the chain, once known.
    pub fn height(&self) -> Option<Height> {
        self.height
    }

    /// The mint version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether this coin was minted under the legacy v1 parameter set.
    pub fn is_v1(&self) -> bool {
        self.version < PUBKEY_COIN_VERSION
    }

    /// The parameter set this coin belongs to.
    pub fn params_version(&self) -> ParamsVersion {
        if self.is_v1() {
            ParamsVersion::V1
        } else {
            ParamsVersion::V2
        }
    }
}
