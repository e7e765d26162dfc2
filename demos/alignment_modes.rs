use affine_aligner::{AlignmentMode, GapPenalty, Sequence, SequenceAligner, SubstitutionMatrix};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let seq1 = Sequence::dna(b"GGGGACTACTACTACTACTGGGG")?;
    let seq2 = Sequence::dna(b"CCACTACTGACTACTACTCC")?;

    // NUC.4.4 base scores with gap (11, 1)
    let aligner = SequenceAligner::with_default_options(AlignmentMode::Global);
    println!("Global score: {}", aligner.align_fast(&seq1, &seq2)?);

    let aligner = aligner.with_alignment_mode("local".parse()?);
    println!("Local score: {}", aligner.align_fast(&seq1, &seq2)?);

    // Cheaper gaps with a simple match/mismatch scheme
    let aligner = SequenceAligner::new(
        GapPenalty::new(5, 3)?,
        SubstitutionMatrix::match_mismatch(2, -2),
        AlignmentMode::Local,
        Sequence::dna,
    );
    println!("Local score, gap (5, 3): {}", aligner.align_fast(&seq1, &seq2)?);

    Ok(())
}
