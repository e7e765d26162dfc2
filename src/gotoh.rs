//! Score-only affine-gap alignment (Gotoh) in linear space.
//!
//! Three states per cell:
//!
//! - `M`: alignment ends with `a[i]` paired against `b[j]`
//! - `X`: alignment ends with a gap consuming `a[i]` (gap in `b`)
//! - `Y`: alignment ends with a gap consuming `b[j]` (gap in `a`)
//!
//! Only the previous and current rows of each state are kept, so memory is
//! `O(len(b))` whatever the length of `a`. Put the shorter sequence second
//! to get `O(min(n, m))`.

use crate::alignment_mode::{AlignmentMode, GapPenalty};
use crate::scoring::ScoringFunction;
use crate::AlignerError;

/// Previous and current rows of `M`, `X` and `Y`.
///
/// Owned by whoever runs the sweep; a worker keeps one and reuses it for every
/// trial. Cells are `i64` so that candidates which fall out of `i32` range
/// only fail the alignment when they end up in the reported score.
#[derive(Debug, Default, Clone)]
pub struct RollingRows {
    prev_m: Vec<i64>,
    prev_x: Vec<i64>,
    prev_y: Vec<i64>,
    cur_m: Vec<i64>,
    cur_x: Vec<i64>,
    cur_y: Vec<i64>,
}

impl RollingRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(width: usize) -> Self {
        let mut rows = Self::default();
        rows.reset(width);
        rows
    }

    /// Sizes every row to `width` cells. Capacity is kept between calls.
    pub fn reset(&mut self, width: usize) {
        for row in [
            &mut self.prev_m,
            &mut self.prev_x,
            &mut self.prev_y,
            &mut self.cur_m,
            &mut self.cur_x,
            &mut self.cur_y,
        ] {
            row.clear();
            row.resize(width, 0);
        }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.prev_m, &mut self.cur_m);
        std::mem::swap(&mut self.prev_x, &mut self.cur_x);
        std::mem::swap(&mut self.prev_y, &mut self.cur_y);
    }
}

#[inline]
fn add(a: i64, b: i64) -> Result<i64, AlignerError> {
    a.checked_add(b)
        .ok_or_else(|| AlignerError::ArithmeticOverflow(format!("{} + {}", a, b)))
}

#[inline]
fn sub(a: i64, b: i64) -> Result<i64, AlignerError> {
    a.checked_sub(b)
        .ok_or_else(|| AlignerError::ArithmeticOverflow(format!("{} - {}", a, b)))
}

#[inline]
fn max3(a: i64, b: i64, c: i64) -> i64 {
    a.max(b).max(c)
}

fn narrow(score: i64) -> Result<i32, AlignerError> {
    i32::try_from(score).map_err(|_| {
        AlignerError::ArithmeticOverflow(format!("alignment score {} exceeds i32", score))
    })
}

/// Score-only affine-gap aligner.
///
/// Pure: the same inputs always give the same score and nothing is shared
/// between calls except the caller's [`RollingRows`].
///
/// The sweep runs in 64-bit cells; the optimum is checked back into `i32`.
/// A large penalty on a path that loses therefore never raises
/// [`AlignerError::ArithmeticOverflow`].
#[derive(Debug)]
pub struct AffineGapAligner<'a, S: ?Sized> {
    scoring: &'a S,
    gap: GapPenalty,
    mode: AlignmentMode,
}

impl<'a, S: ?Sized> Clone for AffineGapAligner<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: ?Sized> Copy for AffineGapAligner<'a, S> {}

impl<'a, S> AffineGapAligner<'a, S>
where
    S: ScoringFunction + ?Sized,
{
    pub fn new(scoring: &'a S, gap: GapPenalty, mode: AlignmentMode) -> Self {
        Self { scoring, gap, mode }
    }

    pub fn gap_penalty(&self) -> GapPenalty {
        self.gap
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn scoring(&self) -> &'a S {
        self.scoring
    }

    /// Optimal alignment score of `a` against `b`.
    pub fn score(&self, a: &[u8], b: &[u8]) -> Result<i32, AlignerError> {
        let mut rows = RollingRows::new();
        self.score_with(&mut rows, a, b)
    }

    /// Same as [`score`](Self::score), sweeping inside caller-owned rows.
    pub fn score_with(
        &self,
        rows: &mut RollingRows,
        a: &[u8],
        b: &[u8],
    ) -> Result<i32, AlignerError> {
        self.scoring.validate(a)?;
        self.scoring.validate(b)?;

        let (n, m) = (a.len(), b.len());
        if n == 0 || m == 0 {
            return match self.mode {
                AlignmentMode::Local => Ok(0),
                AlignmentMode::Global if n == m => Ok(0),
                AlignmentMode::Global => Ok(-self.gap.cost(n.max(m))?),
            };
        }

        let best = match self.mode {
            AlignmentMode::Global => self.sweep(rows, a, b, false)?,
            AlignmentMode::Local => self.sweep(rows, a, b, true)?,
        };
        narrow(best)
    }

    /// `open + length * extension`, widened.
    fn gap_cost(&self, length: usize) -> Result<i64, AlignerError> {
        let length = i64::try_from(length).map_err(|_| {
            AlignerError::ArithmeticOverflow(format!("gap length {} exceeds i64", length))
        })?;
        length
            .checked_mul(i64::from(self.gap.extension()))
            .and_then(|ext| ext.checked_add(i64::from(self.gap.open())))
            .ok_or_else(|| {
                AlignerError::ArithmeticOverflow(format!("gap of length {}", length))
            })
    }

    /// Fills row 0 of `rows.prev_*`.
    fn init_top_row(&self, rows: &mut RollingRows, local: bool) -> Result<(), AlignerError> {
        let open = i64::from(self.gap.open());
        // below anything reachable from a real cell, including -open
        let unreachable = -open - 1;

        rows.prev_m[0] = 0;
        rows.prev_x[0] = unreachable;
        rows.prev_y[0] = unreachable;

        for j in 1..rows.prev_m.len() {
            if local {
                rows.prev_m[j] = 0;
                rows.prev_x[j] = unreachable;
                rows.prev_y[j] = unreachable;
            } else {
                // leading gap in `a` of length j; M and X cannot end here
                let y = -self.gap_cost(j)?;
                let placeholder = sub(sub(y, open)?, 1)?;
                rows.prev_m[j] = placeholder;
                rows.prev_x[j] = placeholder;
                rows.prev_y[j] = y;
            }
        }
        Ok(())
    }

    /// `(M, X, Y)` for column 0 of row `i`.
    fn left_column(&self, i: usize, local: bool) -> Result<(i64, i64, i64), AlignerError> {
        let open = i64::from(self.gap.open());
        if local {
            let unreachable = -open - 1;
            return Ok((0, unreachable, unreachable));
        }
        // leading gap in `b` of length i; M and Y cannot end here
        let x = -self.gap_cost(i)?;
        let placeholder = sub(sub(x, open)?, 1)?;
        Ok((placeholder, x, placeholder))
    }

    /// Best cell in local mode, the `(n, m)` cell in global mode.
    fn sweep(
        &self,
        rows: &mut RollingRows,
        a: &[u8],
        b: &[u8],
        local: bool,
    ) -> Result<i64, AlignerError> {
        let open = i64::from(self.gap.open());
        let extension = i64::from(self.gap.extension());
        let width = b.len() + 1;

        rows.reset(width);
        self.init_top_row(rows, local)?;

        let mut best = 0;
        let mut last = 0;

        for (i, &sa) in a.iter().enumerate() {
            let (mut left_m, mut left_x, mut left_y) = self.left_column(i + 1, local)?;
            rows.cur_m[0] = left_m;
            rows.cur_x[0] = left_x;
            rows.cur_y[0] = left_y;

            for (j, &sb) in b.iter().enumerate() {
                let col = j + 1;

                let diag = max3(rows.prev_m[j], rows.prev_x[j], rows.prev_y[j]);
                let mut m = add(i64::from(self.scoring.score(sa, sb)), diag)?;
                if local && m < 0 {
                    m = 0;
                }

                let x = sub(
                    max3(
                        sub(rows.prev_m[col], open)?,
                        sub(rows.prev_y[col], open)?,
                        rows.prev_x[col],
                    ),
                    extension,
                )?;

                let y = sub(
                    max3(sub(left_m, open)?, sub(left_x, open)?, left_y),
                    extension,
                )?;

                rows.cur_m[col] = m;
                rows.cur_x[col] = x;
                rows.cur_y[col] = y;
                left_m = m;
                left_x = x;
                left_y = y;

                last = max3(m, x, y);
                if last > best {
                    best = last;
                }
            }
            rows.swap();
        }

        Ok(if local { best } else { last })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::scoring::SubstitutionMatrix;
    use proptest::prelude::*;

    fn dna_seq(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')], 1..=max_len)
    }

    proptest! {
        #[test]
        fn identity_scores_match_times_length(seq in dna_seq(60)) {
            let matrix = SubstitutionMatrix::match_mismatch(2, -2);
            let aligner = AffineGapAligner::new(&matrix, GapPenalty::new(5, 3).unwrap(), AlignmentMode::Global);
            prop_assert_eq!(aligner.score(&seq, &seq).unwrap(), 2 * seq.len() as i32);
        }

        #[test]
        fn local_score_nonnegative(a in dna_seq(40), b in dna_seq(40)) {
            let matrix = SubstitutionMatrix::match_mismatch(2, -2);
            let aligner = AffineGapAligner::new(&matrix, GapPenalty::new(5, 3).unwrap(), AlignmentMode::Local);
            prop_assert!(aligner.score(&a, &b).unwrap() >= 0);
        }

        #[test]
        fn local_at_least_global(a in dna_seq(40), b in dna_seq(40)) {
            let matrix = SubstitutionMatrix::match_mismatch(2, -2);
            let gap = GapPenalty::new(5, 3).unwrap();
            let global = AffineGapAligner::new(&matrix, gap, AlignmentMode::Global).score(&a, &b).unwrap();
            let local = AffineGapAligner::new(&matrix, gap, AlignmentMode::Local).score(&a, &b).unwrap();
            prop_assert!(local >= global);
        }

        #[test]
        fn symmetric_for_symmetric_scoring(a in dna_seq(40), b in dna_seq(40)) {
            let matrix = SubstitutionMatrix::match_mismatch(2, -2);
            let aligner = AffineGapAligner::new(&matrix, GapPenalty::new(5, 3).unwrap(), AlignmentMode::Global);
            prop_assert_eq!(aligner.score(&a, &b).unwrap(), aligner.score(&b, &a).unwrap());
        }

        #[test]
        fn local_substring_survives_flanks(
            core in dna_seq(20),
            left in 0usize..8,
            right in 0usize..8,
        ) {
            // flanks use symbols that never match the core or each other
            let matrix = SubstitutionMatrix::match_mismatch(2, -2);
            let aligner = AffineGapAligner::new(&matrix, GapPenalty::new(5, 3).unwrap(), AlignmentMode::Local);
            let mut a = vec![b'N'; left];
            a.extend_from_slice(&core);
            a.extend(std::iter::repeat(b'N').take(right));
            let mut b = vec![b'R'; right];
            b.extend_from_slice(&core);
            b.extend(std::iter::repeat(b'R').take(left));
            prop_assert_eq!(aligner.score(&a, &b).unwrap(), aligner.score(&core, &core).unwrap());
        }
    }
}
