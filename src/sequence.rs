use std::fmt;

use crate::AlignerError;

/// IUPAC nucleotide codes accepted by [`Sequence::dna`].
const IUPAC_NUCLEOTIDES: &[u8] = b"ACGTURYSWKMBDHVN";

/// An immutable run of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    data: Vec<u8>,
}

impl Sequence {
    /// Wraps `data` as-is, without checking the alphabet.
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Builds a nucleotide sequence, upper-casing the input.
    ///
    /// Fails with [`AlignerError::InvalidArgument`] on anything outside the
    /// IUPAC nucleotide codes.
    pub fn dna(data: &[u8]) -> Result<Self, AlignerError> {
        let mut normalized = Vec::with_capacity(data.len());
        for (pos, &base) in data.iter().enumerate() {
            let upper = base.to_ascii_uppercase();
            if !IUPAC_NUCLEOTIDES.contains(&upper) {
                return Err(AlignerError::InvalidArgument(format!(
                    "invalid nucleotide {:?} at position {}",
                    base as char, pos
                )));
            }
            normalized.push(upper);
        }
        Ok(Self { data: normalized })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every symbol is the same, e.g. `TTTTTTT`.
    pub fn is_homopolymer(&self) -> bool {
        match self.data.split_first() {
            Some((first, rest)) => rest.iter().all(|b| b == first),
            None => false,
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.data))
    }
}

/// Builds sequences from raw symbols on behalf of the permutation test.
///
/// Any `Fn(&[u8]) -> Result<Sequence, AlignerError>` is a factory, so
/// `Sequence::dna` can be passed directly.
pub trait SequenceFactory {
    fn create(&self, symbols: &[u8]) -> Result<Sequence, AlignerError>;
}

impl<F> SequenceFactory for F
where
    F: Fn(&[u8]) -> Result<Sequence, AlignerError>,
{
    fn create(&self, symbols: &[u8]) -> Result<Sequence, AlignerError> {
        self(symbols)
    }
}

/// Factory that accepts any symbols.
pub fn raw_sequence(symbols: &[u8]) -> Result<Sequence, AlignerError> {
    Ok(Sequence::new(symbols))
}
