//! Shuffle-test significance for an observed alignment score.
//!
//! The second sequence is permuted `trials` times; each permutation is scored
//! against the first sequence with the score-only aligner. The p-value is
//!
//! ```text
//! p = 1 - rank / (trials + 1)
//! ```
//!
//! where `rank` counts permutations the observed score strictly beats. The
//! `+ 1` keeps `p` above zero (floor `1 / (trials + 1)`), at the price of a
//! slightly conservative estimate.
//!
//! Low-complexity sequences are a known weak spot: their permutations tend to
//! score exactly like the unshuffled sequence, so `p` stops saying anything about
//! structure. A homopolymer always gets `p = 1`.

use std::fmt;

use log::{debug, warn};

use crate::config::PermutationConfig;
use crate::gotoh::AffineGapAligner;
use crate::scoring::ScoringFunction;
use crate::sequence::{Sequence, SequenceFactory};
use crate::shuffle::clock_seed;
use crate::traceback::FullAlignmentResult;
use crate::worker_pool::TrialJob;
use crate::AlignerError;

/// `1 - rank / (trials + 1)`.
pub fn permutation_p_value(rank: usize, trials: usize) -> f64 {
    1.0 - rank as f64 / (trials as f64 + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceResult {
    original_score: i32,
    similarity: f64,
    p_value: f64,
    rank: usize,
    trials: usize,
}

impl SignificanceResult {
    pub fn original_score(&self) -> i32 {
        self.original_score
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Permutations the observed score beat.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn trials(&self) -> usize {
        self.trials
    }
}

impl fmt::Display for SignificanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score={}", self.original_score)?;
        writeln!(f, "similarity={:.6}", self.similarity)?;
        write!(f, "pvalue={}", self.p_value)
    }
}

/// A full alignment together with its shuffle-test p-value.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentWithPValue {
    pub alignment: FullAlignmentResult,
    pub significance: SignificanceResult,
}

impl AlignmentWithPValue {
    pub fn p_value(&self) -> f64 {
        self.significance.p_value()
    }
}

impl fmt::Display for AlignmentWithPValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.alignment)?;
        write!(f, "pvalue={}", self.significance.p_value())
    }
}

pub struct PermutationTester<'a, S: ?Sized, F> {
    aligner: AffineGapAligner<'a, S>,
    factory: &'a F,
    config: PermutationConfig,
}

impl<'a, S, F> PermutationTester<'a, S, F>
where
    S: ScoringFunction + Sync + ?Sized,
    F: SequenceFactory + Sync,
{
    pub fn new(aligner: AffineGapAligner<'a, S>, factory: &'a F, config: PermutationConfig) -> Self {
        Self {
            aligner,
            factory,
            config,
        }
    }

    pub fn config(&self) -> &PermutationConfig {
        &self.config
    }

    /// Uses the original sequences carried by `observed`.
    pub fn estimate_from_alignment(
        &self,
        observed: &FullAlignmentResult,
    ) -> Result<SignificanceResult, AlignerError> {
        self.estimate(observed, observed.original_a(), observed.original_b())
    }

    /// Permutes `raw_b`, scores each permutation against `raw_a`.
    ///
    /// Fails fast: the first trial error, or a passed deadline, ends the run
    /// and no p-value is returned.
    pub fn estimate(
        &self,
        observed: &FullAlignmentResult,
        raw_a: &Sequence,
        raw_b: &Sequence,
    ) -> Result<SignificanceResult, AlignerError> {
        // at least one, enforced by PermutationConfig::with_trials
        let trials = self.config.trials();
        if raw_a.is_empty() || raw_b.is_empty() {
            return Err(AlignerError::InvalidArgument(
                "sequences for the permutation test must not be empty".to_string(),
            ));
        }
        if raw_b.is_homopolymer() {
            warn!(
                "permuting a homopolymer of length {}; every trial will match the original",
                raw_b.len()
            );
        }

        let seed = self.config.seed().unwrap_or_else(clock_seed);
        let workers = self.config.effective_workers(trials);
        debug!(
            "permutation test: {} trials on {} workers, seed {}, mode {}",
            trials,
            workers,
            seed,
            self.aligner.mode()
        );

        let job = TrialJob {
            aligner: self.aligner,
            factory: self.factory,
            fixed: raw_a.as_bytes(),
            shuffled: raw_b.as_bytes(),
            observed_score: observed.score(),
            seed,
            trials,
            deadline: self.config.deadline(),
        };
        let rank = job.run(workers)?;
        let p_value = permutation_p_value(rank, trials);
        debug!("rank {} of {} trials, p={}", rank, trials, p_value);

        Ok(SignificanceResult {
            original_score: observed.score(),
            similarity: observed.similarity(),
            p_value,
            rank,
            trials,
        })
    }
}
