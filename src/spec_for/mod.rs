use crate::types::{MisError, RoundRecord};
use rayon::prelude::*;
use tracing::debug;

/// Two-phase step plugged into [`SpeculativeFor`].
///
/// Within one round every `reserve` runs before any `commit`. A `reserve`
/// may write only state owned by its own index and must not read what
/// another `reserve` of the same round writes.
pub trait SpeculativeStep: Sync {
    /// Makes a tentative decision for `i`. Returning `false` retires `i`
    /// without a commit.
    fn reserve(&self, i: usize) -> bool;

    /// Publishes the tentative decision; `true` iff `i` is now resolved.
    fn commit(&self, i: usize) -> bool;
}

/// Optimistic batch scheduler over an index range.
///
/// Each round runs reserve then commit over a batch made of the indices
/// retried from the previous round followed by fresh indices, both in
/// ascending order. Since batches advance through the range in order, every
/// index below the smallest pending one is already resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeculativeFor {
    batch_size: Option<usize>,
}

impl SpeculativeFor {
    /// `batch_size` of `None` admits the whole remaining range each round.
    pub fn new(batch_size: Option<usize>) -> Self {
        Self { batch_size }
    }

    pub fn run<S>(&self, step: &S, start: usize, end: usize) -> Result<Vec<RoundRecord>, MisError>
    where
        S: SpeculativeStep + ?Sized,
    {
        let total = end.saturating_sub(start);
        let cap = self.batch_size.unwrap_or(total).max(1);
        let mut pending: Vec<usize> = Vec::new();
        let mut fresh = start;
        let mut log = Vec::new();

        loop {
            let take = cap.saturating_sub(pending.len()).min(end.saturating_sub(fresh));
            let mut batch = std::mem::take(&mut pending);
            batch.extend(fresh..fresh + take);
            fresh += take;
            if batch.is_empty() {
                break;
            }

            let keep: Vec<bool> = batch.par_iter().map(|&i| step.reserve(i)).collect();
            let retry: Vec<usize> = batch
                .par_iter()
                .zip(keep.par_iter())
                .filter_map(|(&i, &keep)| (keep && !step.commit(i)).then_some(i))
                .collect();

            let round = log.len();
            let resolved = batch.len() - retry.len();
            if resolved == 0 {
                return Err(MisError::NoProgress {
                    round,
                    pending: batch.len(),
                });
            }

            let remaining = retry.len() + end.saturating_sub(fresh);
            debug!(
                "speculative round = {} batch = {} resolved = {} remaining = {}",
                round,
                batch.len(),
                resolved,
                remaining
            );
            log.push(RoundRecord {
                round,
                frontier: batch.len(),
                resolved,
                remaining,
                mode: None,
                traversal: None,
            });
            pending = retry;
        }

        Ok(log)
    }
}
