use std::cell::RefCell;
use std::time::Duration;

use affine_aligner::{
    AffineGapAligner, AlignerError, AlignmentMode, FullAligner, FullAlignmentResult, GapPenalty,
    PermutationConfig, ScoringFunction, Sequence, SequenceAligner, SequenceCreator,
    SubstitutionMatrix, GAP,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Stands in for a traceback aligner: takes the score from the linear-space
/// sweep and lays the rows out end to end.
#[derive(Default)]
struct StubFullAligner {
    seen: RefCell<Vec<(GapPenalty, AlignmentMode)>>,
}

impl<S: ScoringFunction> FullAligner<S> for StubFullAligner {
    fn align_full(
        &self,
        a: &Sequence,
        b: &Sequence,
        scoring: &S,
        gap: GapPenalty,
        mode: AlignmentMode,
    ) -> Result<FullAlignmentResult, AlignerError> {
        self.seen.borrow_mut().push((gap, mode));
        let score = AffineGapAligner::new(scoring, gap, mode).score(a.as_bytes(), b.as_bytes())?;

        let width = a.len().max(b.len());
        let mut row_a = a.as_bytes().to_vec();
        row_a.resize(width, GAP);
        let mut row_b = b.as_bytes().to_vec();
        row_b.resize(width, GAP);
        let same = row_a.iter().zip(&row_b).filter(|(x, y)| x == y).count();
        let similarity = same as f64 / width.max(1) as f64;

        FullAlignmentResult::new(score, similarity, &row_a, &row_b, a.clone(), b.clone())
    }
}

fn test_aligner(config: PermutationConfig) -> SequenceAligner<SubstitutionMatrix, SequenceCreator> {
    SequenceAligner::new(
        GapPenalty::new(5, 3).unwrap(),
        SubstitutionMatrix::match_mismatch(2, -2),
        AlignmentMode::Global,
        Sequence::dna as SequenceCreator,
    )
    .with_permutation_config(config)
}

const RELATED_A: &[u8] = b"ATGCGTACCTTGAGCTAGGCTACGATCGGATCCATGAGTC";
const RELATED_B: &[u8] = b"ATGCGTACCTTGAGCTAGGCTACGTATCGGATCCATGAGTC";

#[test]
fn end_to_end_example_score() {
    init_logger();
    let aligner = test_aligner(PermutationConfig::new());
    assert_eq!(aligner.align_fast_raw(b"ACTACTACTACTACT", b"ACTACTGACTACTACT").unwrap(), 22);
}

#[test]
fn related_pair_is_significant() {
    init_logger();
    let config = PermutationConfig::new().with_trials(200).unwrap().with_seed(2016);
    let aligner = test_aligner(config);
    let a = Sequence::dna(RELATED_A).unwrap();
    let b = Sequence::dna(RELATED_B).unwrap();

    let full = StubFullAligner::default();
    let result = aligner.align_and_estimate(&full, &a, &b).unwrap();

    assert_eq!(result.alignment.score(), 2 * 40 - (5 + 3));
    assert_eq!(result.significance.original_score(), result.alignment.score());
    assert!(result.p_value() < 0.05, "p={}", result.p_value());
    assert!(result.p_value() >= 1.0 / 201.0 - 1e-12);
    assert!(result.to_string().ends_with(&format!("pvalue={}", result.p_value())));
}

#[test]
fn collaborator_receives_configuration() {
    let aligner = test_aligner(PermutationConfig::new()).with_alignment_mode(AlignmentMode::Local);
    let full = StubFullAligner::default();
    let a = Sequence::dna(b"ACGT").unwrap();
    aligner.align(&full, &a, &a).unwrap();
    assert_eq!(
        full.seen.borrow().as_slice(),
        &[(GapPenalty::new(5, 3).unwrap(), AlignmentMode::Local)]
    );
}

#[test]
fn fixed_seed_is_reproducible_across_worker_counts() {
    init_logger();
    let a = Sequence::dna(b"ACGTTGCAAGGCTTACGATC").unwrap();
    let b = Sequence::dna(b"ACGTTGAAGGCTTTCGATCA").unwrap();
    let full = StubFullAligner::default();
    let observed = test_aligner(PermutationConfig::new()).align(&full, &a, &b).unwrap();

    let p_value = |workers: usize| {
        let config = PermutationConfig::new()
            .with_trials(120)
            .unwrap()
            .with_seed(77)
            .with_workers(workers)
            .unwrap();
        test_aligner(config).estimate_p_value(&observed).unwrap().p_value()
    };

    let reference = p_value(1);
    assert_eq!(p_value(1), reference);
    assert_eq!(p_value(2), reference);
    assert_eq!(p_value(7), reference);
    assert!(reference > 0.0 && reference <= 1.0);
}

#[test]
fn expired_deadline_fails_whole_estimation() {
    init_logger();
    let config = PermutationConfig::new()
        .with_trials(50)
        .unwrap()
        .with_seed(1)
        .with_timeout(Duration::ZERO);
    let aligner = test_aligner(config);
    let a = Sequence::dna(RELATED_A).unwrap();
    let b = Sequence::dna(RELATED_B).unwrap();
    let err = aligner
        .align_and_estimate(&StubFullAligner::default(), &a, &b)
        .unwrap_err();
    assert!(matches!(err, AlignerError::DeadlineExceeded { trials: 50, .. }));
}

#[test]
fn homopolymer_caveat_is_preserved() {
    init_logger();
    let config = PermutationConfig::new().with_trials(30).unwrap().with_seed(9);
    let aligner = test_aligner(config);
    let t = Sequence::dna(b"TTTTTTT").unwrap();
    let result = aligner
        .align_and_estimate(&StubFullAligner::default(), &t, &t)
        .unwrap();
    assert_eq!(result.alignment.score(), 14);
    assert_eq!(result.significance.rank(), 0);
    assert_eq!(result.p_value(), 1.0);
}

#[test]
fn overflowing_trial_fails_whole_estimation() {
    let huge = |_: u8, _: u8| i32::MAX / 3;
    let aligner = SequenceAligner::new(
        GapPenalty::new(1, 1).unwrap(),
        huge,
        AlignmentMode::Global,
        affine_aligner::raw_sequence,
    )
    .with_permutation_config(PermutationConfig::new().with_trials(10).unwrap().with_seed(4));
    let a = Sequence::new(b"ACGT");
    let rows = FullAlignmentResult::new(0, 0.0, b"ACGT", b"TGCA", a.clone(), Sequence::new(b"TGCA")).unwrap();
    assert!(matches!(
        aligner.estimate_p_value(&rows),
        Err(AlignerError::ArithmeticOverflow(_))
    ));
}

#[test]
fn foreign_symbols_rejected_by_factory() {
    let config = PermutationConfig::new().with_trials(3).unwrap().with_seed(4);
    let aligner = test_aligner(config);
    let observed = FullAlignmentResult::new(
        0,
        0.0,
        b"AC",
        b"AJ",
        Sequence::new(b"AC"),
        Sequence::new(b"AJ"),
    )
    .unwrap();
    assert!(matches!(
        aligner.estimate_p_value(&observed),
        Err(AlignerError::InvalidArgument(_))
    ));
}
