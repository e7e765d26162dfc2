use std::fmt;
use std::str::FromStr;

use crate::{AlignerError, DEFAULT_GAP_EXTENSION, DEFAULT_GAP_OPEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentMode {
    Global, // Needleman-Wunsch
    Local,  // Smith-Waterman
}

impl FromStr for AlignmentMode {
    type Err = AlignerError;

    /// Accepts the linear-space aliases as well; the score-only sweep is
    /// linear-space either way.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" | "global_linear_space" => Ok(AlignmentMode::Global),
            "local" | "local_linear_space" => Ok(AlignmentMode::Local),
            _ => Err(AlignerError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Global => write!(f, "global"),
            AlignmentMode::Local => write!(f, "local"),
        }
    }
}

/// Affine gap costs. A gap of length `L` contributes `-(open + L * extension)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapPenalty {
    open: i32,
    extension: i32,
}

impl GapPenalty {
    pub fn new(open: i32, extension: i32) -> Result<Self, AlignerError> {
        if open < 0 || extension < 0 {
            return Err(AlignerError::InvalidConfiguration(format!(
                "gap penalties must be non-negative (open={}, extension={})",
                open, extension
            )));
        }
        Ok(Self { open, extension })
    }

    pub fn open(&self) -> i32 {
        self.open
    }

    pub fn extension(&self) -> i32 {
        self.extension
    }

    /// Cost of a single gap of `length` symbols, as a positive number.
    pub fn cost(&self, length: usize) -> Result<i32, AlignerError> {
        let length = i32::try_from(length).map_err(|_| {
            AlignerError::ArithmeticOverflow(format!("gap length {} exceeds i32", length))
        })?;
        length
            .checked_mul(self.extension)
            .and_then(|ext| ext.checked_add(self.open))
            .ok_or_else(|| {
                AlignerError::ArithmeticOverflow(format!(
                    "gap of length {} with open={} extension={}",
                    length, self.open, self.extension
                ))
            })
    }
}

impl Default for GapPenalty {
    fn default() -> Self {
        Self {
            open: DEFAULT_GAP_OPEN,
            extension: DEFAULT_GAP_EXTENSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!("global".parse::<AlignmentMode>().unwrap(), AlignmentMode::Global);
        assert_eq!("LOCAL".parse::<AlignmentMode>().unwrap(), AlignmentMode::Local);
        assert_eq!(
            "Global_Linear_Space".parse::<AlignmentMode>().unwrap(),
            AlignmentMode::Global
        );
        assert_eq!(
            "local_linear_space".parse::<AlignmentMode>().unwrap(),
            AlignmentMode::Local
        );
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "semiglobal".parse::<AlignmentMode>().unwrap_err();
        assert!(matches!(err, AlignerError::UnsupportedMode(ref m) if m == "semiglobal"));
    }

    #[test]
    fn negative_penalties_are_rejected() {
        assert!(matches!(
            GapPenalty::new(-1, 1),
            Err(AlignerError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            GapPenalty::new(1, -1),
            Err(AlignerError::InvalidConfiguration(_))
        ));
        assert!(GapPenalty::new(0, 0).is_ok());
    }

    #[test]
    fn gap_cost_is_affine() {
        let gap = GapPenalty::new(5, 3).unwrap();
        assert_eq!(gap.cost(1).unwrap(), 8);
        assert_eq!(gap.cost(9).unwrap(), 32);
        assert_eq!(gap.cost(0).unwrap(), 5);
    }

    #[test]
    fn gap_cost_overflow() {
        let gap = GapPenalty::new(0, i32::MAX / 2).unwrap();
        assert!(matches!(gap.cost(3), Err(AlignerError::ArithmeticOverflow(_))));
    }

    #[test]
    fn default_penalty() {
        let gap = GapPenalty::default();
        assert_eq!((gap.open(), gap.extension()), (11, 1));
    }
}
