use std::time::{Duration, Instant};

use crate::{AlignerError, DEFAULT_TRIALS, MAX_WORKERS};

/// Settings for the shuffle test.
#[derive(Debug, Clone)]
pub struct PermutationConfig {
    trials: usize,
    seed: Option<u64>,
    workers: usize, // 0 = detect
    deadline: Option<Instant>,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            workers: 0,
            deadline: None,
        }
    }
}

impl PermutationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trials(mut self, trials: usize) -> Result<Self, AlignerError> {
        if trials < 1 {
            return Err(AlignerError::InvalidArgument(
                "at least one permutation trial is required".to_string(),
            ));
        }
        self.trials = trials;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self, AlignerError> {
        if workers > MAX_WORKERS {
            return Err(AlignerError::InvalidConfiguration(format!(
                "Workers count cannot be greater than {}",
                MAX_WORKERS
            )));
        }
        self.workers = workers;
        Ok(self)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Worker threads to use for `trials` trials: the configured count, or the
    /// machine's parallelism, never more than there are trials.
    pub fn effective_workers(&self, trials: usize) -> usize {
        let workers = if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(MAX_WORKERS)
        } else {
            self.workers
        };
        workers.min(trials).max(1)
    }
}
