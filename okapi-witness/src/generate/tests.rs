//! Tests for the incremental witness-update algorithm.

use num_bigint::BigUint;

use okapi_chain::{
    block::Height,
    transaction,
    zerocoin::{
        Accumulator, Denomination, Params, ParamsVersion, ZerocoinMint, PUBKEY_COIN_VERSION,
    },
};

use crate::{
    generate::{generate_witness, WitnessError, WitnessOutcome},
    index::{ChainIndex, MemoryChainIndex},
    witness::CoinWitnessData,
    Config,
};

fn mint_at(height: u32, seed: u64) -> ZerocoinMint {
    ZerocoinMint::new(
        Denomination::Ten,
        BigUint::from(seed),
        BigUint::from(seed),
        BigUint::from(seed),
        transaction::Hash([seed as u8; 32]),
        0,
        Some(Height(height)),
        PUBKEY_COIN_VERSION,
    )
}

fn populate(index: &mut MemoryChainIndex, mints: &[ZerocoinMint]) {
    for mint in mints {
        index.add_mint(
            mint.height().expect("test mints have heights"),
            mint.txid(),
            mint.public_coin(),
        );
    }
}

/// Mint 50 coins across heights 100..=149, track the one minted at height
/// 120, and catch it up to height 150.
#[test]
fn fifty_mints_end_to_end() {
    let mut index = MemoryChainIndex::new();
    let mints: Vec<ZerocoinMint> = (0..50).map(|i| mint_at(100 + i, 1_000 + u64::from(i))).collect();
    populate(&mut index, &mints);
    index.set_tip(Height(150));

    let mut data = CoinWitnessData::new(&mints[20]);
    let outcome = generate_witness(&mut data, &index, &Config::default(), Height(150), None)
        .expect("witness generation succeeds");

    // Every same-denomination mint other than the tracked coin is folded in.
    assert_eq!(outcome, WitnessOutcome::Complete { folds: 50 });
    assert_eq!(data.mints_added(), 49);
    assert_eq!(data.acc_start_height(), Some(Height(100)));
    assert_eq!(data.acc_end_height(), Some(Height(150)));

    // The witness proves membership in the full height-150 accumulator.
    let accumulator = data.accumulator().expect("record is bootstrapped");
    let witness = data.witness().expect("record is bootstrapped");
    assert!(witness.verify(accumulator));

    let mut expected = Accumulator::new(
        Params::for_version(ParamsVersion::V2),
        Denomination::Ten,
    );
    for mint in &mints {
        expected.accumulate(&mint.public_coin()).expect("well formed");
    }
    assert_eq!(accumulator, &expected);

    // A second request to the same target is a no-op.
    let outcome = generate_witness(&mut data, &index, &Config::default(), Height(150), None)
        .expect("caught-up record succeeds trivially");
    assert_eq!(outcome, WitnessOutcome::Complete { folds: 0 });
}

#[test]
fn tracked_coin_alone_is_not_enough_mints() {
    let mut index = MemoryChainIndex::new();
    let mints = vec![mint_at(100, 77)];
    populate(&mut index, &mints);
    index.set_tip(Height(110));

    let mut data = CoinWitnessData::new(&mints[0]);
    assert_eq!(
        generate_witness(&mut data, &index, &Config::default(), Height(110), None),
        Err(WitnessError::NotEnoughMints {
            height: Height(110)
        })
    );
}

/// A request past the computation bound commits consistent partial
/// progress, and follow-up requests finish the job.
#[test]
fn bounded_computation_reports_partial_progress() {
    let mut index = MemoryChainIndex::new();
    let mints: Vec<ZerocoinMint> = (0..30).map(|i| mint_at(10 + i, 500 + u64::from(i))).collect();
    populate(&mut index, &mints);
    index.set_tip(Height(39));

    let config = Config {
        checkpoint_jump_threshold: 1_000,
        max_folds_per_request: 10,
    };

    let mut data = CoinWitnessData::new(&mints[0]);
    let mut previous_end = Height(0);
    let mut requests = 0;

    loop {
        requests += 1;
        assert!(requests <= 10, "bounded requests must terminate");

        match generate_witness(&mut data, &index, &config, Height(39), None)
            .expect("witness generation succeeds")
        {
            WitnessOutcome::Partial { reached, folds } => {
                assert!(folds <= config.max_folds_per_request);
                assert_eq!(data.acc_end_height(), Some(reached));
                // The committed range only ever grows.
                assert!(reached >= previous_end);
                previous_end = reached;
            }
            WitnessOutcome::Complete { .. } => break,
        }
    }

    assert_eq!(requests, 3);
    assert_eq!(data.acc_end_height(), Some(Height(39)));
    assert_eq!(data.mints_added(), 29);
    assert!(data
        .witness()
        .expect("record is bootstrapped")
        .verify(data.accumulator().expect("record is bootstrapped")));
}

/// A long catch-up bootstraps from the checkpoint below the mint and jumps
/// the accumulator over checkpointed segments.
#[test]
fn long_catchup_uses_checkpoints() {
    let params = Params::for_version(ParamsVersion::V2);

    let mut index = MemoryChainIndex::new();
    let mints: Vec<ZerocoinMint> = (0..40).map(|i| mint_at(10 * i + 5, 300 + u64::from(i))).collect();
    populate(&mut index, &mints);
    index.set_tip(Height(400));
    index.rebuild_checkpoints(params).expect("mints are well formed");

    // The tracked coin is the mint at height 105.
    let tracked = &mints[10];
    let config = Config {
        checkpoint_jump_threshold: 50,
        max_folds_per_request: u64::MAX,
    };

    let mut data = CoinWitnessData::new(tracked);
    let outcome = generate_witness(&mut data, &index, &config, Height(400), None)
        .expect("witness generation succeeds");

    assert!(matches!(outcome, WitnessOutcome::Complete { .. }));
    assert_eq!(data.acc_start_height(), Some(Height(100)));
    assert_eq!(data.acc_end_height(), Some(Height(400)));
    // Only the mints above the bootstrap checkpoint fold individually.
    assert_eq!(data.mints_added(), 29);

    let checkpoint_height = data.checkpoint_height().expect("a checkpoint was used");
    assert!(checkpoint_height > Height(100));

    // The jumped accumulator matches the chain's aggregate at the target.
    let (_, tip_checkpoint) = index
        .checkpoint_at_or_below(Denomination::Ten, Height(400))
        .expect("checkpoints were rebuilt");
    assert_eq!(data.accumulator(), Some(&tip_checkpoint));
    assert!(data
        .witness()
        .expect("record is bootstrapped")
        .verify(data.accumulator().expect("record is bootstrapped")));
}

#[test]
fn interruption_leaves_the_record_untouched() {
    let mut index = MemoryChainIndex::new();
    let mints: Vec<ZerocoinMint> = (0..20).map(|i| mint_at(10 + i, 700 + u64::from(i))).collect();
    populate(&mut index, &mints);
    index.set_tip(Height(40));

    // A disconnected cancel channel reads as an interrupt request.
    let (cancel_handle, cancel_receiver) = crossbeam_channel::bounded::<super::Cancel>(1);
    drop(cancel_handle);

    let mut data = CoinWitnessData::new(&mints[5]);
    let before = data.clone();
    assert_eq!(
        generate_witness(
            &mut data,
            &index,
            &Config::default(),
            Height(40),
            Some(&cancel_receiver),
        ),
        Err(WitnessError::Interrupted)
    );
    assert_eq!(data, before);

    // Interrupting a partially-advanced record also leaves it at its last
    // committed boundary.
    let config = Config {
        checkpoint_jump_threshold: 1_000,
        max_folds_per_request: 5,
    };
    generate_witness(&mut data, &index, &config, Height(40), None)
        .expect("partial progress succeeds");
    let committed = data.clone();

    let (cancel_handle, cancel_receiver) = crossbeam_channel::bounded::<super::Cancel>(1);
    drop(cancel_handle);
    assert_eq!(
        generate_witness(
            &mut data,
            &index,
            &Config::default(),
            Height(40),
            Some(&cancel_receiver),
        ),
        Err(WitnessError::Interrupted)
    );
    assert_eq!(data, committed);
}

#[test]
fn unreachable_state_is_non_determined() {
    let mut index = MemoryChainIndex::new();
    let mints: Vec<ZerocoinMint> = (0..5).map(|i| mint_at(10 + i, 900 + u64::from(i))).collect();
    populate(&mut index, &mints);
    index.set_tip(Height(50));

    // Target past the tip.
    let mut data = CoinWitnessData::new(&mints[0]);
    assert_eq!(
        generate_witness(&mut data, &index, &Config::default(), Height(60), None),
        Err(WitnessError::NonDetermined { height: Height(50) })
    );

    // A record whose checkpoint is above the tip was built before a
    // reorganization and must be rebuilt from scratch.
    generate_witness(&mut data, &index, &Config::default(), Height(20), None)
        .expect("witness generation succeeds");
    data.checkpoint_height = Some(Height(1_000));
    assert_eq!(
        generate_witness(&mut data, &index, &Config::default(), Height(50), None),
        Err(WitnessError::NonDetermined { height: Height(50) })
    );

    // After a reset, the record is usable again.
    data.set_null();
    generate_witness(&mut data, &index, &Config::default(), Height(50), None)
        .expect("rebuilt record succeeds");
    assert_eq!(data.acc_end_height(), Some(Height(50)));

    // An empty chain can never answer.
    let empty = MemoryChainIndex::new();
    let mut fresh = CoinWitnessData::new(&mints[0]);
    assert_eq!(
        generate_witness(&mut fresh, &empty, &Config::default(), Height(0), None),
        Err(WitnessError::NonDetermined { height: Height(0) })
    );
}
