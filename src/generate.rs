use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::io::ProblemDocument;

// Small dense problems with integer data: up to 5 variables, at most as
// many <= rows as variables and a positive right-hand side, so x = 0 is
// always feasible.
pub fn random_problem<R: Rng>(rng: &mut R) -> ProblemDocument {
    let n = rng.gen_range(1..=5);
    let m = rng.gen_range(1..=n);

    let vector_n = (0..n).map(|_| rng.gen_range(-10..=10) as f64).collect();
    let matrix = (0..m)
        .map(|_| (0..n).map(|_| rng.gen_range(-10..=10) as f64).collect())
        .collect();
    let vector_m = (0..m).map(|_| rng.gen_range(1..=20) as f64).collect();

    ProblemDocument {
        vector_n,
        matrix,
        vector_m,
        vector_sign: vec![1; m],
        binary_vector_n: Some(vec![1; n]),
    }
}

pub fn random_batch(count: usize, seed: u64) -> Vec<ProblemDocument> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_problem(&mut rng)).collect()
}

#[test]
fn batch_is_reproducible() {
    let first = random_batch(20, 7);
    let second = random_batch(20, 7);
    assert_eq!(first, second);
    for document in first.iter() {
        let n = document.vector_n.len();
        assert!(n >= 1 && n <= 5);
        assert!(document.matrix.len() <= n);
        assert!(document.vector_m.iter().all(|&b| b >= 1.0));
        document.to_general_form().expect("Generated problems are well formed");
    }
}
