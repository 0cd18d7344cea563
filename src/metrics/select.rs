use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// k-th smallest element (0-based) under `less`, by randomized selection.
///
/// Partitions around a random pivot and recurses into the side holding
/// rank `k`. Returns `None` when `k` is out of range.
pub fn kth_smallest<T, F>(values: &[T], k: usize, less: F, seed: u64) -> Option<T>
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    if k >= values.len() {
        return None;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current: Vec<T> = values.to_vec();
    let mut k = k;

    loop {
        let pivot = current[rng.gen_range(0..current.len())];
        let smaller: Vec<T> = current.iter().copied().filter(|a| less(a, &pivot)).collect();
        if k < smaller.len() {
            current = smaller;
            continue;
        }
        let larger: Vec<T> = current.iter().copied().filter(|a| less(&pivot, a)).collect();
        if k >= current.len() - larger.len() {
            k -= current.len() - larger.len();
            current = larger;
            continue;
        }
        return Some(pivot);
    }
}
