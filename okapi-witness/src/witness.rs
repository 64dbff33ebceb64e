//! Per-mint witness tracking records.

use serde::{Deserialize, Serialize};

use okapi_chain::{
    block::Height,
    transaction,
    zerocoin::{Accumulator, AccumulatorWitness, Denomination, PublicCoin, ZerocoinMint},
};

/// Everything the wallet tracks about one mint's membership witness.
///
/// A record is created when a mint is detected as belonging to the local
/// wallet, advanced repeatedly by the witness-update algorithm as the chain
/// grows, and archived once the coin is spent. The witness and accumulator
/// are replaced wholesale on each advance, never mutated in place across
/// threads: records are handed to the background worker by value and handed
/// back through its response channel.
///
/// # Invariants
///
/// The witness and the height range are always committed together: when
/// [`Self::witness`] is `Some`, it is the witness for exactly the mints up
/// to [`Self::acc_end_height`], and [`Self::accumulator`] is the full
/// aggregate at that same height.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CoinWitnessData {
    pub(crate) coin: PublicCoin,
    pub(crate) accumulator: Option<Accumulator>,
    pub(crate) witness: Option<AccumulatorWitness>,
    pub(crate) denomination: Denomination,
    pub(crate) checkpoint_height: Option<Height>,
    pub(crate) mint_added_height: Option<Height>,
    pub(crate) acc_start_height: Option<Height>,
    pub(crate) acc_end_height: Option<Height>,
    pub(crate) mints_added: u64,
    pub(crate) txid: transaction::Hash,
    pub(crate) is_v1: bool,
}

impl CoinWitnessData {
    /// Creates a fresh tracking record for a wallet mint.
    ///
    /// The witness and accumulator start empty; the first call to the
    /// update algorithm bootstraps them.
    pub fn new(mint: &ZerocoinMint) -> Self {
        CoinWitnessData {
            coin: mint.public_coin(),
            accumulator: None,
            witness: None,
            denomination: mint.denomination(),
            checkpoint_height: None,
            mint_added_height: mint.height(),
            acc_start_height: None,
            acc_end_height: None,
            mints_added: 0,
            txid: mint.txid(),
            is_v1: mint.is_v1(),
        }
    }

    /// Records the height the mint was included at.
    ///
    /// One-shot: used only when the mint's height was unknown at
    /// construction time, before the record is first advanced.
    pub fn set_height_mint_added(&mut self, height: Height) {
        self.mint_added_height = Some(height);
    }

    /// Discards all derived witness state, keeping only the coin's
    /// identity.
    ///
    /// Used when a witness must be rebuilt from scratch, such as after a
    /// reorganization past the checkpoint it was built from.
    pub fn set_null(&mut self) {
        self.accumulator = None;
        self.witness = None;
        self.checkpoint_height = None;
        self.acc_start_height = None;
        self.acc_end_height = None;
        self.mints_added = 0;
    }

    /// The tracked coin.
    pub fn coin(&self) -> &PublicCoin {
        &self.coin
    }

    /// The full accumulator at [`Self::acc_end_height`], once bootstrapped.
    pub fn accumulator(&self) -> Option<&Accumulator> {
        self.accumulator.as_ref()
    }

    /// The coin's membership witness at [`Self::acc_end_height`], once
    /// bootstrapped.
    pub fn witness(&self) -> Option<&AccumulatorWitness> {
        self.witness.as_ref()
    }

    /// The coin's denomination.
    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// The height of the accumulator checkpoint the witness was last built
    /// or advanced from, if any was used.
    pub fn checkpoint_height(&self) -> Option<Height> {
        self.checkpoint_height
    }

    /// The height the tracked mint was added to the chain.
    pub fn mint_added_height(&self) -> Option<Height> {
        self.mint_added_height
    }

    /// The first height folded into the current witness.
    pub fn acc_start_height(&self) -> Option<Height> {
        self.acc_start_height
    }

    /// The last height folded into the current witness. Non-decreasing
    /// across updates.
    pub fn acc_end_height(&self) -> Option<Height> {
        self.acc_end_height
    }

    /// How many other coins have been folded into the witness so far.
    pub fn mints_added(&self) -> u64 {
        self.mints_added
    }

    /// The minting transaction's id.
    pub fn txid(&self) -> transaction::Hash {
        self.txid
    }

    /// Whether the coin uses the legacy v1 parameter set.
    pub fn is_v1(&self) -> bool {
        self.is_v1
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use okapi_chain::zerocoin::{Params, ParamsVersion, PUBKEY_COIN_VERSION};

    use super::*;

    fn mint() -> ZerocoinMint {
        let params = Params::for_version(ParamsVersion::V2);
        let serial = BigUint::from(11u32);
        let randomness = BigUint::from(13u32);

        ZerocoinMint::new(
            Denomination::Fifty,
            params.coin_commitment(&serial, &randomness),
            serial,
            randomness,
            transaction::Hash([9; 32]),
            1,
            Some(Height(120)),
            PUBKEY_COIN_VERSION,
        )
    }

    #[test]
    fn new_record_copies_mint_identity() {
        let mint = mint();
        let data = CoinWitnessData::new(&mint);

        assert_eq!(data.coin(), &mint.public_coin());
        assert_eq!(data.denomination(), Denomination::Fifty);
        assert_eq!(data.mint_added_height(), Some(Height(120)));
        assert_eq!(data.txid(), mint.txid());
        assert!(!data.is_v1());

        assert_eq!(data.witness(), None);
        assert_eq!(data.accumulator(), None);
        assert_eq!(data.acc_end_height(), None);
        assert_eq!(data.mints_added(), 0);
    }

    #[test]
    fn set_null_keeps_identity_fields() {
        let mint = mint();
        let mut data = CoinWitnessData::new(&mint);

        data.acc_start_height = Some(Height(100));
        data.acc_end_height = Some(Height(150));
        data.checkpoint_height = Some(Height(140));
        data.mints_added = 49;

        data.set_null();

        assert_eq!(data.acc_start_height(), None);
        assert_eq!(data.acc_end_height(), None);
        assert_eq!(data.checkpoint_height(), None);
        assert_eq!(data.mints_added(), 0);

        assert_eq!(data.coin(), &mint.public_coin());
        assert_eq!(data.mint_added_height(), Some(Height(120)));
        assert_eq!(data.txid(), mint.txid());
    }
}
