//! Incremental witness updates.
//!
//! [`generate_witness`] advances a [`CoinWitnessData`] record from the
//! height it is currently valid through up to a requested target height,
//! folding in every other mint of the same denomination along the way. The
//! work is split into segments: short catch-ups fold the accumulator and
//! witness together mint-by-mint, while long catch-ups fold only the
//! witness and jump the accumulator to a precomputed checkpoint, halving
//! the modular exponentiations.
//!
//! A record is only ever committed at a segment or height boundary, with
//! the witness, accumulator, and height range written together. Work past
//! the last boundary is discarded on interruption, so a stopped request
//! can never leave a half-updated record.

use crossbeam_channel::{Receiver, TryRecvError};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use okapi_chain::{
    block::Height,
    zerocoin::{Accumulator, AccumulatorError, AccumulatorWitness, Params, ParamsVersion},
};

use crate::{config::Config, index::ChainIndex, witness::CoinWitnessData};

#[cfg(test)]
mod tests;

/// A message telling in-flight witness generation to stop at the next safe
/// point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cancel;

/// The outcome of a witness-update request that made progress.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WitnessOutcome {
    /// The record is caught up to the requested target height.
    Complete {
        /// The number of mint events processed by this request.
        folds: u64,
    },

    /// The per-request computation bound was reached before the target.
    ///
    /// The record was committed at a consistent boundary; the caller should
    /// re-enqueue a follow-up request to continue from there.
    Partial {
        /// The height the record is now valid through.
        reached: Height,
        /// The number of mint events processed by this request.
        folds: u64,
    },
}

/// An error describing why a witness-update request produced no usable
/// result.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum WitnessError {
    /// Too few other mints of this denomination exist in the requested
    /// range for the witness to be usable.
    ///
    /// Not fatal: the caller may retry once more coins have been minted.
    #[error("not enough mints of this denomination at height {height:?}")]
    NotEnoughMints {
        /// The height at which the decision was made.
        height: Height,
    },

    /// The request could not be conclusively resolved, for example because
    /// the target is past the tip or the starting checkpoint is gone.
    ///
    /// The caller should rebuild the record with [`CoinWitnessData::set_null`]
    /// and retry.
    #[error("witness state could not be determined at height {height:?}")]
    NonDetermined {
        /// The height at which the decision was made.
        height: Height,
    },

    /// The request was interrupted by worker shutdown. The record was left
    /// as of its last committed boundary.
    #[error("witness generation was interrupted")]
    Interrupted,

    /// An accumulator consistency rule was violated. This never happens
    /// under correct operation.
    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
}

impl WitnessError {
    /// The height this error was decided at, where one applies.
    pub fn height(&self) -> Option<Height> {
        match self {
            WitnessError::NotEnoughMints { height } | WitnessError::NonDetermined { height } => {
                Some(*height)
            }
            WitnessError::Interrupted | WitnessError::Accumulator(_) => None,
        }
    }
}

/// In-flight update state, committed back to the record only at consistent
/// boundaries.
struct WorkingState {
    accumulator: Accumulator,
    witness: AccumulatorWitness,
    start_height: Option<Height>,
    checkpoint_height: Option<Height>,
    /// The next height to process; everything below it is folded in.
    next_height: Height,
    mints_added: u64,
}

impl WorkingState {
    /// Writes the witness, accumulator, and height range back to the record
    /// as one consistent unit.
    fn commit(&self, data: &mut CoinWitnessData) -> Height {
        let end = (self.next_height - 1)
            .expect("state is only committed after at least one height was processed");

        data.accumulator = Some(self.accumulator.clone());
        data.witness = Some(self.witness.clone());
        data.acc_start_height = self.start_height;
        data.acc_end_height = Some(end);
        data.checkpoint_height = self.checkpoint_height;
        data.mints_added = self.mints_added;

        end
    }
}

/// Returns an error if interruption has been requested.
fn check_interrupt(cancel_receiver: Option<&Receiver<Cancel>>) -> Result<(), WitnessError> {
    let Some(cancel_receiver) = cancel_receiver else {
        return Ok(());
    };

    if !matches!(cancel_receiver.try_recv(), Err(TryRecvError::Empty)) {
        return Err(WitnessError::Interrupted);
    }

    Ok(())
}

/// Advances `data` up to `target_height`, folding in every other mint of
/// its denomination between the record's current end and the target.
///
/// The tracked coin itself is folded into the accumulator but never into
/// its own witness.
///
/// Returns [`WitnessOutcome::Partial`] when the configured computation
/// bound is reached first, so a single request can never block the worker
/// indefinitely. On any error the record is left exactly as of its last
/// committed boundary.
#[instrument(skip(data, index, config, cancel_receiver), fields(txid = %data.txid(), denom = %data.denomination()))]
pub fn generate_witness<I: ChainIndex>(
    data: &mut CoinWitnessData,
    index: &I,
    config: &Config,
    target_height: Height,
    cancel_receiver: Option<&Receiver<Cancel>>,
) -> Result<WitnessOutcome, WitnessError> {
    let tip = index
        .tip_height()
        .ok_or(WitnessError::NonDetermined { height: Height(0) })?;
    if target_height > tip {
        return Err(WitnessError::NonDetermined { height: tip });
    }

    let params_version = if data.is_v1 {
        ParamsVersion::V1
    } else {
        ParamsVersion::V2
    };
    let params = Params::for_version(params_version);
    let max_folds = config.max_folds_per_request.max(1);
    let threshold = i32::try_from(config.checkpoint_jump_threshold).unwrap_or(i32::MAX);

    let mut state = match (&data.accumulator, &data.witness, data.acc_end_height) {
        (Some(accumulator), Some(witness), Some(acc_end)) => {
            if acc_end >= target_height {
                if data.mints_added == 0 {
                    return Err(WitnessError::NotEnoughMints { height: acc_end });
                }
                return Ok(WitnessOutcome::Complete { folds: 0 });
            }

            // A checkpoint past the tip means the chain reorganized under
            // us; the witness must be rebuilt from scratch.
            if data.checkpoint_height.map_or(false, |cp| cp > tip) {
                return Err(WitnessError::NonDetermined { height: tip });
            }

            WorkingState {
                accumulator: accumulator.clone(),
                witness: witness.clone(),
                start_height: data.acc_start_height,
                checkpoint_height: data.checkpoint_height,
                next_height: (acc_end + 1).expect("end is below the target, which is a valid height"),
                mints_added: data.mints_added,
            }
        }
        _ => {
            let mint_height = data
                .mint_added_height
                .ok_or(WitnessError::NonDetermined { height: tip })?;

            // Bootstrap from the highest checkpoint below the mint: that
            // aggregate cannot contain the tracked coin, so it is a valid
            // witness starting point.
            let below_mint = (mint_height - 1)
                .and_then(|height| index.checkpoint_at_or_below(data.denomination, height));

            match below_mint {
                Some((checkpoint_height, checkpoint)) => {
                    debug!(?checkpoint_height, "bootstrapping witness from checkpoint");
                    WorkingState {
                        accumulator: checkpoint.clone(),
                        witness: AccumulatorWitness::new(checkpoint, data.coin.clone()),
                        start_height: Some(checkpoint_height),
                        checkpoint_height: Some(checkpoint_height),
                        next_height: (checkpoint_height + 1)
                            .expect("checkpoints are below the tip, which is a valid height"),
                        mints_added: 0,
                    }
                }
                None => WorkingState {
                    accumulator: Accumulator::new(params, data.denomination),
                    witness: AccumulatorWitness::new(
                        Accumulator::new(params, data.denomination),
                        data.coin.clone(),
                    ),
                    start_height: None,
                    checkpoint_height: None,
                    next_height: Height(0),
                    mints_added: 0,
                },
            }
        }
    };

    let mut folds_this_request: u64 = 0;

    while state.next_height <= target_height {
        check_interrupt(cancel_receiver)?;

        let remaining = target_height - state.next_height;
        let segment_target = if remaining > threshold {
            (state.next_height + threshold).expect("stays below the target, which is valid")
        } else {
            target_height
        };

        // A long catch-up jumps the accumulator over the whole segment via
        // a checkpoint; only the witness folds mint-by-mint.
        let jump = if remaining > threshold {
            index
                .checkpoint_at_or_below(data.denomination, segment_target)
                .filter(|(height, _)| *height >= state.next_height)
        } else {
            None
        };

        match jump {
            Some((checkpoint_height, checkpoint)) => {
                let events =
                    index.mints_in_range(data.denomination, state.next_height..=checkpoint_height);

                // The checkpointed accumulator only matches a witness that
                // has folded the entire segment, so a segment that does not
                // fit the remaining budget is not started at all.
                if folds_this_request + events.len() as u64 > max_folds {
                    return Ok(partial(data, &state, folds_this_request));
                }

                for event in &events {
                    check_interrupt(cancel_receiver)?;

                    if event.coin == data.coin {
                        trace!(height = ?event.height, "skipping the tracked coin");
                    } else {
                        state.witness.fold(&event.coin)?;
                        state.mints_added += 1;
                    }
                    if state.start_height.is_none() {
                        state.start_height = Some(event.height);
                    }
                    folds_this_request += 1;
                }

                state.accumulator = checkpoint;
                state.checkpoint_height = Some(checkpoint_height);
                state.next_height = (checkpoint_height + 1)
                    .expect("checkpoints are below the tip, which is a valid height");
            }
            None => {
                let events =
                    index.mints_in_range(data.denomination, state.next_height..=segment_target);

                let mut idx = 0;
                while idx < events.len() {
                    let height = events[idx].height;

                    check_interrupt(cancel_receiver)?;
                    if folds_this_request >= max_folds {
                        state.next_height = height;
                        return Ok(partial(data, &state, folds_this_request));
                    }

                    // Mints inside one block are folded atomically, so the
                    // committed range always ends at a block boundary.
                    while idx < events.len() && events[idx].height == height {
                        let event = &events[idx];

                        state.accumulator.accumulate(&event.coin)?;
                        if event.coin == data.coin {
                            trace!(height = ?event.height, "tracked coin folds into the accumulator only");
                        } else {
                            state.witness.fold(&event.coin)?;
                            state.mints_added += 1;
                        }
                        if state.start_height.is_none() {
                            state.start_height = Some(height);
                        }
                        folds_this_request += 1;
                        idx += 1;
                    }
                }

                state.next_height =
                    (segment_target + 1).expect("segment target is at most the tip");
            }
        }

        state.commit(data);
    }

    if state.mints_added == 0 {
        return Err(WitnessError::NotEnoughMints {
            height: target_height,
        });
    }

    debug!(
        folds = folds_this_request,
        mints_added = state.mints_added,
        "witness caught up to target"
    );
    Ok(WitnessOutcome::Complete {
        folds: folds_this_request,
    })
}

/// Commits whatever consistent progress exists and reports a partial
/// outcome.
fn partial(data: &mut CoinWitnessData, state: &WorkingState, folds: u64) -> WitnessOutcome {
    if state.next_height == Height(0) {
        // The very first segment did not fit the computation budget; there
        // is nothing consistent to commit yet.
        warn!("witness request made no progress; raise max_folds_per_request");
        return WitnessOutcome::Partial {
            reached: Height(0),
            folds,
        };
    }

    let reached = state.commit(data);
    WitnessOutcome::Partial { reached, folds }
}
