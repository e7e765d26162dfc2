use crate::{AlignerError, Sequence, DNA_MATCH, DNA_MISMATCH};

/// Score contribution of aligning one symbol against another.
///
/// Any `Fn(u8, u8) -> i32` is a scoring function. Implementations that only
/// cover part of the byte range override [`ScoringFunction::validate`] so the
/// aligner can reject foreign symbols before sweeping.
pub trait ScoringFunction {
    fn score(&self, a: u8, b: u8) -> i32;

    fn validate(&self, _seq: &[u8]) -> Result<(), AlignerError> {
        Ok(())
    }
}

impl<F> ScoringFunction for F
where
    F: Fn(u8, u8) -> i32,
{
    fn score(&self, a: u8, b: u8) -> i32 {
        self(a, b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionMatrix {
    /// Uniform match/mismatch scores, case-insensitive.
    MatchMismatch { match_score: i32, mismatch_score: i32 },
    /// Square table over a fixed alphabet. Symbols outside the alphabet must
    /// be rejected through [`ScoringFunction::validate`] first; scoring one
    /// directly yields 0 in release builds and panics in debug builds.
    Table(ScoreTable),
}

impl SubstitutionMatrix {
    pub fn match_mismatch(match_score: i32, mismatch_score: i32) -> Self {
        SubstitutionMatrix::MatchMismatch {
            match_score,
            mismatch_score,
        }
    }

    /// NUC.4.4 values for the unambiguous bases.
    pub fn dna_default() -> Self {
        Self::match_mismatch(DNA_MATCH, DNA_MISMATCH)
    }

    /// Square table over `alphabet`, row-major in `scores`.
    pub fn table(alphabet: &[u8], scores: Vec<i32>) -> Result<Self, AlignerError> {
        ScoreTable::new(alphabet, scores).map(SubstitutionMatrix::Table)
    }

    /// Checks every symbol of `seq` against the matrix alphabet.
    pub fn check_sequence(&self, seq: &Sequence) -> Result<(), AlignerError> {
        self.validate(seq.as_bytes())
    }
}

impl ScoringFunction for SubstitutionMatrix {
    fn score(&self, a: u8, b: u8) -> i32 {
        match self {
            SubstitutionMatrix::MatchMismatch {
                match_score,
                mismatch_score,
            } => {
                if a.eq_ignore_ascii_case(&b) {
                    *match_score
                } else {
                    *mismatch_score
                }
            }
            SubstitutionMatrix::Table(table) => table.lookup(a, b),
        }
    }

    fn validate(&self, seq: &[u8]) -> Result<(), AlignerError> {
        match self {
            SubstitutionMatrix::MatchMismatch { .. } => Ok(()),
            SubstitutionMatrix::Table(table) => table.validate(seq),
        }
    }
}

const UNMAPPED: u8 = u8::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    index: [u8; 256],
    dim: usize,
    scores: Vec<i32>,
}

impl ScoreTable {
    fn new(alphabet: &[u8], scores: Vec<i32>) -> Result<Self, AlignerError> {
        let dim = alphabet.len();
        if dim == 0 || dim >= UNMAPPED as usize {
            return Err(AlignerError::InvalidConfiguration(format!(
                "substitution alphabet must hold 1..{} symbols, got {}",
                UNMAPPED, dim
            )));
        }
        if scores.len() != dim * dim {
            return Err(AlignerError::InvalidConfiguration(format!(
                "substitution table for {} symbols needs {} scores, got {}",
                dim,
                dim * dim,
                scores.len()
            )));
        }

        let mut index = [UNMAPPED; 256];
        for (i, &symbol) in alphabet.iter().enumerate() {
            if index[symbol as usize] != UNMAPPED {
                return Err(AlignerError::InvalidConfiguration(format!(
                    "duplicate symbol {:?} in substitution alphabet",
                    symbol as char
                )));
            }
            index[symbol as usize] = i as u8;
        }

        Ok(Self { index, dim, scores })
    }

    fn lookup(&self, a: u8, b: u8) -> i32 {
        let (row, col) = (self.index[a as usize], self.index[b as usize]);
        if row == UNMAPPED || col == UNMAPPED {
            debug_assert!(
                false,
                "symbol pair ({:?}, {:?}) not in the substitution alphabet",
                a as char, b as char
            );
            return 0;
        }
        self.scores[row as usize * self.dim + col as usize]
    }

    fn validate(&self, seq: &[u8]) -> Result<(), AlignerError> {
        match seq.iter().position(|&s| self.index[s as usize] == UNMAPPED) {
            Some(pos) => Err(AlignerError::InvalidArgument(format!(
                "symbol {:?} at position {} is not in the substitution alphabet",
                seq[pos] as char, pos
            ))),
            None => Ok(()),
        }
    }
}
