use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Shuffle `0..n` with a seeded generator and cut it into (train, valid).
///
/// Each part gets `floor(n * fraction)` indices; leftovers go to train first,
/// then valid, one at a time. The same seed always gives the same split.
pub fn random_split(n: usize, train_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let f = train_fraction.clamp(0.0, 1.0);
    // tolerance so 10 * (1 - 0.8) still floors to 2
    let part = |frac: f64| ((n as f64 * frac) + 1e-9).floor() as usize;
    let mut train_len = part(f).min(n);
    let mut valid_len = part(1.0 - f).min(n - train_len);
    let mut to_train = true;
    while train_len + valid_len < n {
        if to_train { train_len += 1 } else { valid_len += 1 }
        to_train = !to_train;
    }

    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    idx.shuffle(&mut rng);
    let valid = idx.split_off(train_len);
    (idx, valid)
}
