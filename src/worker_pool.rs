use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{unbounded, Sender};
use log::{trace, warn};

use crate::gotoh::{AffineGapAligner, RollingRows};
use crate::scoring::ScoringFunction;
use crate::sequence::SequenceFactory;
use crate::shuffle::{fisher_yates, Xorshift64};
use crate::AlignerError;

/// Everything a worker needs to run its share of trials. Read-only; each
/// worker keeps its own rows and shuffle buffer.
pub(crate) struct TrialJob<'a, S: ?Sized, F> {
    pub aligner: AffineGapAligner<'a, S>,
    pub factory: &'a F,
    pub fixed: &'a [u8],
    pub shuffled: &'a [u8],
    pub observed_score: i32,
    pub seed: u64,
    pub trials: usize,
    pub deadline: Option<Instant>,
}

enum WorkOutcome {
    Completed(usize),
    Failed(AlignerError),
    Aborted,
}

struct WorkResult {
    worker_id: usize,
    outcome: WorkOutcome,
}

struct Shared {
    abort: AtomicBool,
    completed: AtomicUsize,
}

impl<'a, S, F> TrialJob<'a, S, F>
where
    S: ScoringFunction + Sync + ?Sized,
    F: SequenceFactory + Sync,
{
    /// Runs every trial and returns how many permutations scored strictly
    /// below the observed score.
    pub fn run(&self, workers: usize) -> Result<usize, AlignerError> {
        let shared = Shared {
            abort: AtomicBool::new(false),
            completed: AtomicUsize::new(0),
        };

        if workers <= 1 {
            return match self.work(0..self.trials, &shared) {
                WorkOutcome::Completed(wins) => Ok(wins),
                WorkOutcome::Failed(e) => Err(e),
                WorkOutcome::Aborted => Err(AlignerError::WorkerFailure(
                    "trial run aborted without a cause".to_string(),
                )),
            };
        }

        let chunk = self.trials.div_ceil(workers);
        let (result_tx, result_rx) = unbounded();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for worker_id in 0..workers {
                let start = worker_id * chunk;
                let end = (start + chunk).min(self.trials);
                if start >= end {
                    break;
                }
                let tx: Sender<WorkResult> = result_tx.clone();
                let shared = &shared;
                handles.push(scope.spawn(move || {
                    let outcome = self.work(start..end, shared);
                    let _ = tx.send(WorkResult { worker_id, outcome });
                }));
            }
            drop(result_tx);

            let mut wins = 0;
            let mut failure = None;
            let mut aborted = false;
            for result in result_rx.iter() {
                match result.outcome {
                    WorkOutcome::Completed(n) => {
                        trace!("worker {} done, {} wins", result.worker_id, n);
                        wins += n;
                    }
                    WorkOutcome::Failed(e) => {
                        trace!("worker {} failed: {}", result.worker_id, e);
                        failure.get_or_insert(e);
                    }
                    WorkOutcome::Aborted => aborted = true,
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    failure.get_or_insert(AlignerError::WorkerFailure(
                        "permutation worker panicked".to_string(),
                    ));
                }
            }

            match (failure, aborted) {
                (Some(e), _) => Err(e),
                (None, true) => Err(AlignerError::WorkerFailure(
                    "trial run aborted without a cause".to_string(),
                )),
                (None, false) => Ok(wins),
            }
        })
    }

    fn work(&self, range: Range<usize>, shared: &Shared) -> WorkOutcome {
        let mut rows = RollingRows::with_width(self.shuffled.len() + 1);
        let mut buffer = self.shuffled.to_vec();
        let mut wins = 0;

        for index in range {
            if shared.abort.load(Ordering::Relaxed) {
                return WorkOutcome::Aborted;
            }
            if let Some(e) = self.check_deadline(shared) {
                return WorkOutcome::Failed(e);
            }

            // every trial starts from the original order
            buffer.copy_from_slice(self.shuffled);
            let mut rng = Xorshift64::for_trial(self.seed, index as u64);
            fisher_yates(&mut buffer, &mut rng);

            let scored = self
                .factory
                .create(&buffer)
                .and_then(|permuted| self.aligner.score_with(&mut rows, self.fixed, permuted.as_bytes()));
            match scored {
                Ok(score) => {
                    if self.observed_score > score {
                        wins += 1;
                    }
                }
                Err(e) => {
                    shared.abort.store(true, Ordering::Relaxed);
                    return WorkOutcome::Failed(e);
                }
            }
            shared.completed.fetch_add(1, Ordering::Relaxed);
            // a trial that ran past the deadline still fails the run
            if let Some(e) = self.check_deadline(shared) {
                return WorkOutcome::Failed(e);
            }
        }

        WorkOutcome::Completed(wins)
    }

    fn check_deadline(&self, shared: &Shared) -> Option<AlignerError> {
        let deadline = self.deadline?;
        if Instant::now() < deadline {
            return None;
        }
        shared.abort.store(true, Ordering::Relaxed);
        let completed = shared.completed.load(Ordering::Relaxed);
        warn!("deadline passed after {} of {} trials", completed, self.trials);
        Some(AlignerError::DeadlineExceeded {
            completed,
            trials: self.trials,
        })
    }
}
