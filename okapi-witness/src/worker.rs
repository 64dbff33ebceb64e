//! The light-witness background worker.
//!
//! Witness catch-up is modular-exponentiation-heavy, so it runs on exactly
//! one dedicated thread, off the chain-processing path. Wallet logic
//! enqueues [`WitnessRequest`]s on a FIFO channel; the worker drains them
//! one at a time and reports each result through the request's response
//! channel. Deliberately a single thread, not a pool: the math is CPU-bound
//! and contention-prone, and requests for coins of the same denomination
//! share recomputation when processed in order.
//!
//! Shutdown is cooperative: [`WitnessWorker::stop`] signals the cancel
//! channel and the worker exits at the next safe point, leaving any
//! in-flight record consistent. Only one request per coin should be in
//! flight at a time; the worker does not deduplicate.

use std::{
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, info};

use okapi_chain::block::Height;

use crate::{
    generate::{generate_witness, Cancel, WitnessError, WitnessOutcome},
    index::ChainIndex,
    witness::CoinWitnessData,
    Config,
};

/// A witness-generation request.
///
/// Created by wallet logic, enqueued with [`WitnessWorker::add_work`],
/// consumed exactly once by the worker, then discarded.
#[derive(Debug)]
pub struct WitnessRequest {
    /// The record to advance, handed to the worker by value and handed
    /// back through the response channel.
    pub data: CoinWitnessData,
    /// The height to catch the record up to.
    pub target_height: Height,
    /// Where the result is reported.
    pub response: oneshot::Sender<WitnessResponse>,
}

/// The result reported back for each request.
pub type WitnessResponse = Result<CompletedWork, RejectedWork>;

/// A request the worker finished, completely or partially.
#[derive(Debug)]
pub struct CompletedWork {
    /// The advanced record.
    pub data: CoinWitnessData,
    /// Whether the target was reached, or a follow-up request is needed.
    pub outcome: WitnessOutcome,
}

/// A request the worker could not finish.
#[derive(Debug)]
pub struct RejectedWork {
    /// The record, as of its last consistent state.
    pub data: CoinWitnessData,
    /// The height at which the rejection was decided.
    pub height: Height,
    /// Why the work was rejected.
    pub error: WitnessError,
}

/// The light-witness worker: one background thread and its request queue.
///
/// The worker moves between exactly two states, `Stopped` and `Running`;
/// [`Self::start`] is idempotent and [`Self::stop`] interrupts
/// cooperatively.
#[derive(Debug)]
pub struct WitnessWorker<I> {
    config: Config,
    index: Arc<I>,
    sender: Option<Sender<WitnessRequest>>,
    cancel_handle: Option<Sender<Cancel>>,
    is_running: Arc<AtomicBool>,
    worker_thread: Option<JoinHandle<()>>,
}

impl<I> WitnessWorker<I>
where
    I: ChainIndex + Send + Sync + 'static,
{
    /// Creates a stopped worker that will read chain data from `index`.
    pub fn new(config: Config, index: Arc<I>) -> Self {
        WitnessWorker {
            config,
            index,
            sender: None,
            cancel_handle: None,
            is_running: Arc::new(AtomicBool::new(false)),
            worker_thread: None,
        }
    }

    /// Whether the worker thread is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Starts the worker thread. Does nothing if it is already running.
    pub fn start(&mut self) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            debug!("witness worker thread already running");
            return;
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        let (cancel_handle, cancel_receiver) = crossbeam_channel::bounded(1);

        let config = self.config.clone();
        let index = self.index.clone();
        let is_running = self.is_running.clone();

        self.sender = Some(sender);
        self.cancel_handle = Some(cancel_handle);
        self.worker_thread = Some(thread::spawn(move || {
            Self::run(config, index, receiver, cancel_receiver, is_running);
        }));

        info!("witness worker thread start");
    }

    /// Enqueues a witness-generation request.
    ///
    /// Fails fast if the worker is not running: callers must check the
    /// return value and not assume queueing always succeeds.
    pub fn add_work(&self, request: WitnessRequest) -> bool {
        if !self.is_running() {
            info!("witness worker not running, dropping witness work");
            return false;
        }

        match &self.sender {
            Some(sender) => sender.send(request).is_ok(),
            None => false,
        }
    }

    /// Stops the worker thread, interrupting any in-flight request at its
    /// next safe point, and waits for it to exit.
    pub fn stop(&mut self) {
        if let Some(cancel_handle) = self.cancel_handle.take() {
            let _ = cancel_handle.try_send(Cancel);
        }
        // Dropping the queue sender wakes a worker blocked on an empty
        // queue; dropping the cancel handle disconnects the cancel channel,
        // which in-flight computation also reads as an interrupt.
        self.sender = None;

        if let Some(worker_thread) = self.worker_thread.take() {
            if let Err(thread_panic) = worker_thread.join() {
                panic::resume_unwind(thread_panic);
            }
        }

        self.is_running.store(false, Ordering::SeqCst);
        info!("witness worker thread interrupted");
    }

    /// The worker loop: block until a request is available, run the update
    /// algorithm, report the result.
    fn run(
        config: Config,
        index: Arc<I>,
        receiver: Receiver<WitnessRequest>,
        cancel_receiver: Receiver<Cancel>,
        is_running: Arc<AtomicBool>,
    ) {
        while let Ok(mut request) = receiver.recv() {
            let target_height = request.target_height;

            let result = generate_witness(
                &mut request.data,
                index.as_ref(),
                &config,
                target_height,
                Some(&cancel_receiver),
            );

            match result {
                Ok(outcome) => {
                    debug!(?target_height, ?outcome, "witness work finished");
                    let _ = request.response.send(Ok(CompletedWork {
                        data: request.data,
                        outcome,
                    }));
                }
                Err(WitnessError::Interrupted) => {
                    Self::reject_work(request, target_height, WitnessError::Interrupted);
                    break;
                }
                Err(error) => {
                    let height = error.height().unwrap_or(target_height);
                    Self::reject_work(request, height, error);
                }
            }
        }

        is_running.store(false, Ordering::SeqCst);
        info!("witness worker thread exit");
    }

    /// The single reporting path for work the worker cannot finish.
    fn reject_work(request: WitnessRequest, height: Height, error: WitnessError) {
        info!(
            txid = %request.data.txid(),
            ?height,
            %error,
            "rejecting witness work"
        );

        let _ = request.response.send(Err(RejectedWork {
            data: request.data,
            height,
            error,
        }));
    }
}

impl<I> Drop for WitnessWorker<I> {
    fn drop(&mut self) {
        // Disconnecting both channels is enough for the thread to exit on
        // its own; a detached join handle does not keep the process alive.
        self.cancel_handle = None;
        self.sender = None;
    }
}

#[cfg(test)]
mod tests;
