//! Affine-gap alignment scores with shuffle-test p-values.
//!
//! The score-only aligner ([`AffineGapAligner`]) runs the Gotoh recurrence in
//! linear space. [`PermutationTester`] shuffles one sequence many times and
//! ranks the observed score against the shuffled ones. Full alignments with
//! traceback come from a [`FullAligner`] supplied by the caller.
//!
//! ```
//! use affine_aligner::{AffineGapAligner, AlignmentMode, GapPenalty, SubstitutionMatrix};
//!
//! let matrix = SubstitutionMatrix::match_mismatch(2, -2);
//! let gap = GapPenalty::new(5, 3).unwrap();
//! let aligner = AffineGapAligner::new(&matrix, gap, AlignmentMode::Global);
//! let score = aligner.score(b"ACTACTACTACTACT", b"ACTACTGACTACTACT").unwrap();
//! assert_eq!(score, 2 * 15 - (5 + 3));
//! ```

use thiserror::Error;

pub mod alignment_mode;
pub mod config;
pub mod gotoh;
pub mod scoring;
pub mod sequence;
pub mod shuffle;
pub mod significance;
pub mod traceback;
mod worker_pool;

pub use alignment_mode::{AlignmentMode, GapPenalty};
pub use config::PermutationConfig;
pub use gotoh::{AffineGapAligner, RollingRows};
pub use scoring::{ScoringFunction, SubstitutionMatrix};
pub use sequence::{raw_sequence, Sequence, SequenceFactory};
pub use significance::{
    permutation_p_value, AlignmentWithPValue, PermutationTester, SignificanceResult,
};
pub use traceback::{ColumnKind, FullAligner, FullAlignmentResult, GAP};

// NUC.4.4 scores for unambiguous bases
pub const DNA_MATCH: i32 = 5;
pub const DNA_MISMATCH: i32 = -4;

pub const DEFAULT_GAP_OPEN: i32 = 11;
pub const DEFAULT_GAP_EXTENSION: i32 = 1;

pub const DEFAULT_TRIALS: usize = 200;
pub const MAX_WORKERS: usize = 256;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unsupported alignment mode: {0}")]
    UnsupportedMode(String),
    #[error("Deadline exceeded after {completed} of {trials} trials")]
    DeadlineExceeded { completed: usize, trials: usize },
    #[error("Worker failure: {0}")]
    WorkerFailure(String),
}

/// Factory type used by [`SequenceAligner::with_default_options`].
pub type SequenceCreator = fn(&[u8]) -> Result<Sequence, AlignerError>;

/// Gap penalty, scoring, mode, sequence factory and shuffle-test settings in
/// one place.
///
/// ```
/// use affine_aligner::{AlignmentMode, SequenceAligner};
///
/// let aligner = SequenceAligner::with_default_options(AlignmentMode::Global);
/// assert_eq!(aligner.align_fast_raw(b"ACGT", b"ACGT").unwrap(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceAligner<S, F> {
    gap: GapPenalty,
    scoring: S,
    mode: AlignmentMode,
    factory: F,
    permutation: PermutationConfig,
}

impl SequenceAligner<SubstitutionMatrix, SequenceCreator> {
    /// Gap (11, 1), NUC.4.4 base scores, DNA sequences.
    pub fn with_default_options(mode: AlignmentMode) -> Self {
        Self::new(
            GapPenalty::default(),
            SubstitutionMatrix::dna_default(),
            mode,
            Sequence::dna,
        )
    }
}

impl<S, F> SequenceAligner<S, F>
where
    S: ScoringFunction + Sync,
    F: SequenceFactory + Sync,
{
    pub fn new(gap: GapPenalty, scoring: S, mode: AlignmentMode, factory: F) -> Self {
        Self {
            gap,
            scoring,
            mode,
            factory,
            permutation: PermutationConfig::default(),
        }
    }

    pub fn with_permutation_config(mut self, config: PermutationConfig) -> Self {
        self.permutation = config;
        self
    }

    pub fn with_alignment_mode(mut self, mode: AlignmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn gap_penalty(&self) -> GapPenalty {
        self.gap
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    pub fn permutation_config(&self) -> &PermutationConfig {
        &self.permutation
    }

    pub fn fast_aligner(&self) -> AffineGapAligner<'_, S> {
        AffineGapAligner::new(&self.scoring, self.gap, self.mode)
    }

    /// Score only, no traceback.
    pub fn align_fast(&self, a: &Sequence, b: &Sequence) -> Result<i32, AlignerError> {
        self.fast_aligner().score(a.as_bytes(), b.as_bytes())
    }

    /// Builds both sequences through the factory, then [`align_fast`](Self::align_fast).
    pub fn align_fast_raw(&self, a: &[u8], b: &[u8]) -> Result<i32, AlignerError> {
        let a = self.factory.create(a)?;
        let b = self.factory.create(b)?;
        self.align_fast(&a, &b)
    }

    /// Full alignment through `full`.
    pub fn align<A>(&self, full: &A, a: &Sequence, b: &Sequence) -> Result<FullAlignmentResult, AlignerError>
    where
        A: FullAligner<S> + ?Sized,
    {
        full.align_full(a, b, &self.scoring, self.gap, self.mode)
    }

    /// Shuffle-test p-value for an alignment produced earlier.
    pub fn estimate_p_value(&self, observed: &FullAlignmentResult) -> Result<SignificanceResult, AlignerError> {
        PermutationTester::new(self.fast_aligner(), &self.factory, self.permutation.clone())
            .estimate_from_alignment(observed)
    }

    pub fn align_and_estimate<A>(
        &self,
        full: &A,
        a: &Sequence,
        b: &Sequence,
    ) -> Result<AlignmentWithPValue, AlignerError>
    where
        A: FullAligner<S> + ?Sized,
    {
        let alignment = self.align(full, a, b)?;
        let significance = self.estimate_p_value(&alignment)?;
        Ok(AlignmentWithPValue {
            alignment,
            significance,
        })
    }
}
