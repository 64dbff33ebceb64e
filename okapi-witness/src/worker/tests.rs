//! Tests for the light-witness worker.

use std::sync::Arc;

use num_bigint::BigUint;
use tokio::sync::oneshot;

use okapi_chain::{
    block::Height,
    transaction,
    zerocoin::{Denomination, ZerocoinMint, PUBKEY_COIN_VERSION},
};

use crate::{
    generate::{WitnessError, WitnessOutcome},
    index::MemoryChainIndex,
    witness::CoinWitnessData,
    worker::{WitnessRequest, WitnessWorker},
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

fn indexed_mints(count: u32, tip: u32) -> (Arc<MemoryChainIndex>, Vec<ZerocoinMint>) {
    let mints: Vec<ZerocoinMint> = (0..count)
        .map(|i| mint_at(10 + i, 40_000 + u64::from(i)))
        .collect();

    let mut index = MemoryChainIndex::new();
    for mint in &mints {
        index.add_mint(
            mint.height().expect("test mints have heights"),
            mint.txid(),
            mint.public_coin(),
        );
    }
    index.set_tip(Height(tip));

    (Arc::new(index), mints)
}

fn request_for(
    mint: &ZerocoinMint,
    target: u32,
) -> (WitnessRequest, oneshot::Receiver<super::WitnessResponse>) {
    let (response, receiver) = oneshot::channel();
    let request = WitnessRequest {
        data: CoinWitnessData::new(mint),
        target_height: Height(target),
        response,
    };

    (request, receiver)
}

#[tokio::test]
async fn add_work_fails_fast_when_stopped() {
    let (index, mints) = indexed_mints(5, 50);
    let worker = WitnessWorker::new(Config::default(), index);

    let (request, _receiver) = request_for(&mints[0], 50);
    assert!(!worker.is_running());
    assert!(!worker.add_work(request));
}

#[tokio::test]
async fn start_is_idempotent_and_stop_restarts() {
    let (index, mints) = indexed_mints(5, 50);
    let mut worker = WitnessWorker::new(Config::default(), index);

    worker.start();
    worker.start();
    assert!(worker.is_running());

    worker.stop();
    assert!(!worker.is_running());

    // A stopped worker can be started again.
    worker.start();
    let (request, receiver) = request_for(&mints[0], 50);
    assert!(worker.add_work(request));
    let completed = receiver
        .await
        .expect("worker sends a response")
        .expect("witness generation succeeds");
    assert!(matches!(completed.outcome, WitnessOutcome::Complete { .. }));

    worker.stop();
}

#[tokio::test]
async fn requests_complete_in_fifo_order() {
    let (index, mints) = indexed_mints(20, 50);
    let mut worker = WitnessWorker::new(Config::default(), index);
    worker.start();

    let (first, first_receiver) = request_for(&mints[3], 40);
    let (second, second_receiver) = request_for(&mints[7], 50);
    assert!(worker.add_work(first));
    assert!(worker.add_work(second));

    let first_done = first_receiver
        .await
        .expect("worker sends a response")
        .expect("witness generation succeeds");
    let second_done = second_receiver
        .await
        .expect("worker sends a response")
        .expect("witness generation succeeds");

    assert_eq!(first_done.data.acc_end_height(), Some(Height(40)));
    assert_eq!(second_done.data.acc_end_height(), Some(Height(50)));
    for completed in [&first_done, &second_done] {
        assert!(completed
            .data
            .witness()
            .expect("record is bootstrapped")
            .verify(completed.data.accumulator().expect("record is bootstrapped")));
    }

    worker.stop();
}

#[tokio::test]
async fn unusable_work_is_rejected_with_a_height() {
    let (index, mints) = indexed_mints(1, 30);
    let mut worker = WitnessWorker::new(Config::default(), index);
    worker.start();

    let (request, receiver) = request_for(&mints[0], 30);
    assert!(worker.add_work(request));

    let rejected = receiver
        .await
        .expect("worker sends a response")
        .expect_err("a lone mint cannot produce a witness");
    assert_eq!(
        rejected.error,
        WitnessError::NotEnoughMints {
            height: Height(30)
        }
    );
    assert_eq!(rejected.height, Height(30));

    worker.stop();
}

#[tokio::test]
async fn stopping_mid_request_leaves_a_consistent_record() {
    let (index, mints) = indexed_mints(500, 600);
    let mut worker = WitnessWorker::new(Config::default(), index);
    worker.start();

    let (request, receiver) = request_for(&mints[0], 600);
    assert!(worker.add_work(request));
    worker.stop();

    // Whether the request finished or was interrupted, the record must be
    // either untouched or committed at a consistent boundary.
    let data = match receiver.await.expect("worker sends a response") {
        Ok(completed) => completed.data,
        Err(rejected) => {
            assert_eq!(rejected.error, WitnessError::Interrupted);
            rejected.data
        }
    };

    assert_eq!(data.witness().is_some(), data.accumulator().is_some());
    assert_eq!(data.witness().is_some(), data.acc_end_height().is_some());
    if let (Some(witness), Some(accumulator)) = (data.witness(), data.accumulator()) {
        // A committed record past the mint height proves membership.
        if data.acc_end_height() >= data.mint_added_height() {
            assert!(witness.verify(accumulator));
        }
    }
}
