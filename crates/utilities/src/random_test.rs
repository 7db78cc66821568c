use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Runs the given test the given number of iterations with a random number
/// generator. The seed is printed so that a failing run can be reproduced with
/// [`random_test_seeded`].
pub fn random_test<F>(iterations: usize, test: F)
where
    F: FnMut(&mut StdRng),
{
    let seed: u64 = rand::random();
    random_test_seeded(seed, iterations, test);
}

/// Same as [`random_test`], but with a fixed seed.
pub fn random_test_seeded<F>(seed: u64, iterations: usize, mut test: F)
where
    F: FnMut(&mut StdRng),
{
    println!("random_test seed: {seed}");
    info!("random_test seed: {seed}");

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..iterations {
        test(&mut rng);
    }
}
