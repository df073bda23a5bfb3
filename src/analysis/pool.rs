//! Per-chromosome worker pool.

use rayon::prelude::*;
use tracing::{debug, warn};

/// Run `job` over every item on a pool of `threads` workers.
///
/// Results come back in input order. When the pool cannot be built the jobs
/// run sequentially on the calling thread.
pub fn map_ordered<T, R, F>(threads: usize, jobs: Vec<T>, job: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => {
            debug!(threads, jobs = jobs.len(), "Dispatching chromosomes");
            pool.install(|| jobs.into_par_iter().map(&job).collect())
        }
        Err(e) => {
            warn!(error = %e, "Could not start worker pool, running sequentially");
            jobs.into_iter().map(job).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_keep_input_order() {
        let jobs: Vec<usize> = (0..50).collect();
        let results = map_ordered(4, jobs, |i| i * 2);
        assert_eq!(results, (0..50).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_thread() {
        let results = map_ordered(1, vec!["a", "bb"], str::len);
        assert_eq!(results, vec![1, 2]);
    }
}
