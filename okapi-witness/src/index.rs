//! Read-only chain collaborators for witness generation.
//!
//! The witness engine consumes two chain capabilities: the mint events of a
//! denomination over a height range, and precomputed accumulator
//! checkpoints. Both are behind the [`ChainIndex`] trait so the engine can
//! run against a full node's index, a light client's cache, or the
//! in-memory index used in tests.

use std::{
    collections::{BTreeMap, HashMap},
    ops::RangeInclusive,
};

use okapi_chain::{
    block::Height,
    transaction,
    zerocoin::{Accumulator, AccumulatorError, Denomination, Params, PublicCoin},
};

/// How often accumulator checkpoints are written to the chain, in blocks.
pub const CHECKPOINT_INTERVAL: u32 = 10;

/// One coin-mint event observed on chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintEvent {
    /// The height of the block containing the mint.
    pub height: Height,
    /// The minting transaction's id.
    pub txid: transaction::Hash,
    /// The minted coin.
    pub coin: PublicCoin,
}

/// Read-only access to the chain state witness generation needs.
///
/// The engine only ever reads through this trait; it never writes chain
/// state.
pub trait ChainIndex {
    /// The current chain tip height, or `None` if the chain is empty.
    fn tip_height(&self) -> Option<Height>;

    /// All mint events of `denomination` in `heights`, ordered by ascending
    /// height.
    fn mints_in_range(
        &self,
        denomination: Denomination,
        heights: RangeInclusive<Height>,
    ) -> Vec<MintEvent>;

    /// The highest accumulator checkpoint for `denomination` at or below
    /// `height`, if one exists.
    fn checkpoint_at_or_below(
        &self,
        denomination: Denomination,
        height: Height,
    ) -> Option<(Height, Accumulator)>;
}

/// An in-memory [`ChainIndex`], used by tests and light clients that cache
/// mint events locally.
#[derive(Clone, Debug, Default)]
pub struct MemoryChainIndex {
    tip: Option<Height>,
    mints: BTreeMap<Height, Vec<MintEvent>>,
    checkpoints: HashMap<Denomination, BTreeMap<Height, Accumulator>>,
}

impl MemoryChainIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mint event, extending the tip if needed.
    pub fn add_mint(&mut self, height: Height, txid: transaction::Hash, coin: PublicCoin) {
        self.mints
            .entry(height)
            .or_default()
            .push(MintEvent { height, txid, coin });

        if self.tip.map_or(true, |tip| tip < height) {
            self.tip = Some(height);
        }
    }

    /// Extends the tip past the last mint, for chains whose newest blocks
    /// contain no mints.
    pub fn set_tip(&mut self, height: Height) {
        self.tip = Some(height);
    }

    /// Rebuilds the accumulator checkpoints for every denomination, folding
    /// all recorded mints in height order and storing the aggregate at each
    /// [`CHECKPOINT_INTERVAL`] boundary up to the tip.
    pub fn rebuild_checkpoints(&mut self, params: &Params) -> Result<(), AccumulatorError> {
        let Some(tip) = self.tip else {
            return Ok(());
        };

        let mut checkpoints: HashMap<Denomination, BTreeMap<Height, Accumulator>> = HashMap::new();

        for denomination in Denomination::ALL {
            let mut accumulator = Accumulator::new(params, denomination);
            let mut per_denom = BTreeMap::new();

            let mut events = self
                .mints
                .values()
                .flatten()
                .filter(|event| event.coin.denomination() == denomination)
                .peekable();

            let mut boundary = Height(0);
            while boundary <= tip {
                while let Some(event) = events.peek() {
                    if event.height > boundary {
                        break;
                    }
                    accumulator.accumulate(&event.coin)?;
                    events.next();
                }
                per_denom.insert(boundary, accumulator.clone());

                boundary = match boundary + CHECKPOINT_INTERVAL as i32 {
                    Some(next) => next,
                    None => break,
                };
            }

            checkpoints.insert(denomination, per_denom);
        }

        self.checkpoints = checkpoints;
        Ok(())
    }
}

impl ChainIndex for MemoryChainIndex {
    fn tip_height(&self) -> Option<Height> {
        self.tip
    }

    fn mints_in_range(
        &self,
        denomination: Denomination,
        heights: RangeInclusive<Height>,
    ) -> Vec<MintEvent> {
        self.mints
            .range(heights)
            .flat_map(|(_, events)| events.iter())
            .filter(|event| event.coin.denomination() == denomination)
            .cloned()
            .collect()
    }

    fn checkpoint_at_or_below(
        &self,
        denomination: Denomination,
        height: Height,
    ) -> Option<(Height, Accumulator)> {
        let (checkpoint_height, accumulator) = self
            .checkpoints
            .get(&denomination)?
            .range(..=height)
            .next_back()?;

        Some((*checkpoint_height, accumulator.clone()))
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use okapi_chain::zerocoin::ParamsVersion;

    use super::*;

    fn coin(commitment: u64) -> PublicCoin {
        PublicCoin::new(
            Denomination::Ten,
            ParamsVersion::V2,
            BigUint::from(commitment),
        )
    }

    #[test]
    fn mints_filter_by_denomination_and_range() {
        let mut index = MemoryChainIndex::new();
        index.add_mint(Height(5), transaction::Hash([1; 32]), coin(11));
        index.add_mint(
            Height(6),
            transaction::Hash([2; 32]),
            PublicCoin::new(Denomination::One, ParamsVersion::V2, BigUint::from(13u32)),
        );
        index.add_mint(Height(20), transaction::Hash([3; 32]), coin(17));

        let mints = index.mints_in_range(Denomination::Ten, Height(0)..=Height(10));
        assert_eq!(mints.len(), 1);
        assert_eq!(mints[0].height, Height(5));

        assert_eq!(index.tip_height(), Some(Height(20)));
    }

    #[test]
    fn checkpoints_fold_mints_in_height_order() {
        let params = Params::for_version(ParamsVersion::V2);

        let mut index = MemoryChainIndex::new();
        index.add_mint(Height(3), transaction::Hash([1; 32]), coin(11));
        index.add_mint(Height(14), transaction::Hash([2; 32]), coin(13));
        index.set_tip(Height(25));
        index.rebuild_checkpoints(params).expect("mints are well formed");

        // The checkpoint at 10 contains only the height-3 mint.
        let mut expected = Accumulator::new(params, Denomination::Ten);
        expected.accumulate(&coin(11)).expect("well formed");
        let (height, at_ten) = index
            .checkpoint_at_or_below(Denomination::Ten, Height(13))
            .expect("checkpoint exists");
        assert_eq!(height, Height(10));
        assert_eq!(at_ten, expected);

        // The checkpoint at 20 contains both mints.
        expected.accumulate(&coin(13)).expect("well formed");
        let (height, at_twenty) = index
            .checkpoint_at_or_below(Denomination::Ten, Height(25))
            .expect("checkpoint exists");
        assert_eq!(height, Height(20));
        assert_eq!(at_twenty, expected);
    }
}
