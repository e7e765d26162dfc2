//! Result of a full (traceback) alignment and the trait through which a
//! traceback aligner is plugged in.
//!
//! This crate never builds tracebacks itself. The permutation test reads only
//! the score, the similarity and the original sequences from a
//! [`FullAlignmentResult`]; the counts below are for callers.

use std::fmt;

use crate::alignment_mode::{AlignmentMode, GapPenalty};
use crate::scoring::ScoringFunction;
use crate::{AlignerError, Sequence};

/// Gap marker in aligned rows.
pub const GAP: u8 = b'-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Match,
    Mismatch,
    GapInA,
    GapInB,
}

/// Produces full alignments with traceback.
pub trait FullAligner<S: ScoringFunction + ?Sized> {
    fn align_full(
        &self,
        a: &Sequence,
        b: &Sequence,
        scoring: &S,
        gap: GapPenalty,
        mode: AlignmentMode,
    ) -> Result<FullAlignmentResult, AlignerError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullAlignmentResult {
    score: i32,
    similarity: f64,
    aligned_a: Vec<u8>,
    aligned_b: Vec<u8>,
    original_a: Sequence,
    original_b: Sequence,
}

impl FullAlignmentResult {
    /// Fails with [`AlignerError::InvalidArgument`] when the aligned rows
    /// differ in length, a column is gap against gap, or `similarity` is
    /// outside `[0, 1]`.
    pub fn new(
        score: i32,
        similarity: f64,
        aligned_a: &[u8],
        aligned_b: &[u8],
        original_a: Sequence,
        original_b: Sequence,
    ) -> Result<Self, AlignerError> {
        if aligned_a.len() != aligned_b.len() {
            return Err(AlignerError::InvalidArgument(format!(
                "aligned rows differ in length ({} vs {})",
                aligned_a.len(),
                aligned_b.len()
            )));
        }
        if let Some(col) = aligned_a
            .iter()
            .zip(aligned_b)
            .position(|(&x, &y)| x == GAP && y == GAP)
        {
            return Err(AlignerError::InvalidArgument(format!(
                "column {} is a gap in both rows",
                col
            )));
        }
        if !(0.0..=1.0).contains(&similarity) {
            return Err(AlignerError::InvalidArgument(format!(
                "similarity {} outside [0, 1]",
                similarity
            )));
        }

        Ok(Self {
            score,
            similarity,
            aligned_a: aligned_a.to_vec(),
            aligned_b: aligned_b.to_vec(),
            original_a,
            original_b,
        })
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn aligned_a(&self) -> &[u8] {
        &self.aligned_a
    }

    pub fn aligned_b(&self) -> &[u8] {
        &self.aligned_b
    }

    pub fn original_a(&self) -> &Sequence {
        &self.original_a
    }

    pub fn original_b(&self) -> &Sequence {
        &self.original_b
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.aligned_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned_a.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = ColumnKind> + '_ {
        self.aligned_a
            .iter()
            .zip(&self.aligned_b)
            .map(|(&x, &y)| match (x, y) {
                (GAP, _) => ColumnKind::GapInA,
                (_, GAP) => ColumnKind::GapInB,
                (x, y) if x.eq_ignore_ascii_case(&y) => ColumnKind::Match,
                _ => ColumnKind::Mismatch,
            })
    }

    pub fn matches(&self) -> usize {
        self.count(ColumnKind::Match)
    }

    pub fn mismatches(&self) -> usize {
        self.count(ColumnKind::Mismatch)
    }

    /// Gap symbols in the aligned A row.
    pub fn gaps_in_a(&self) -> usize {
        self.count(ColumnKind::GapInA)
    }

    /// Gap symbols in the aligned B row.
    pub fn gaps_in_b(&self) -> usize {
        self.count(ColumnKind::GapInB)
    }

    /// Gap-open events in the aligned A row.
    pub fn gap_opens_in_a(&self) -> usize {
        count_runs(&self.aligned_a)
    }

    /// Gap-open events in the aligned B row.
    pub fn gap_opens_in_b(&self) -> usize {
        count_runs(&self.aligned_b)
    }

    /// Identical columns over columns without a gap; 0 when every column is
    /// a gap.
    pub fn fraction_identical_of_aligned(&self) -> f64 {
        let aligned = self.matches() + self.mismatches();
        if aligned == 0 {
            return 0.0;
        }
        self.matches() as f64 / aligned as f64
    }

    fn count(&self, kind: ColumnKind) -> usize {
        self.columns().filter(|&k| k == kind).count()
    }
}

fn count_runs(row: &[u8]) -> usize {
    let mut opens = 0;
    let mut in_gap = false;
    for &symbol in row {
        let is_gap = symbol == GAP;
        if is_gap && !in_gap {
            opens += 1;
        }
        in_gap = is_gap;
    }
    opens
}

impl fmt::Display for FullAlignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score={}", self.score)?;
        writeln!(f, "nMatches={}", self.matches())?;
        writeln!(f, "nGapsInA={}", self.gaps_in_a())?;
        writeln!(f, "nGapsInB={}", self.gaps_in_b())?;
        writeln!(f, "nGapOpensInA={}", self.gap_opens_in_a())?;
        writeln!(f, "nGapOpensInB={}", self.gap_opens_in_b())?;
        writeln!(f, "similarity={:.6}", self.similarity)?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.aligned_a))?;
        write!(f, "{}", String::from_utf8_lossy(&self.aligned_b))
    }
}
