//! Worker-count configuration.
//!
//! The worker count of a [`Parallel`](crate::Parallel) policy is always an
//! explicit value. These helpers only supply its default: the
//! `LATTICE_NUM_THREADS` environment variable if it holds a positive integer,
//! else the hardware concurrency.

use tracing::warn;

/// Environment variable overriding the default worker count.
pub const NUM_THREADS_ENV: &str = "LATTICE_NUM_THREADS";

/// Number of threads the ambient hardware (or rayon pool) can run at once.
pub fn hardware_concurrency() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads().max(1)
    }
    #[cfg(not(feature = "parallel"))]
    {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }
}

/// Default worker count for [`Parallel::default`](crate::Parallel).
pub fn default_worker_count() -> usize {
    worker_count_from(std::env::var(NUM_THREADS_ENV).ok().as_deref())
}

fn worker_count_from(value: Option<&str>) -> usize {
    let Some(raw) = value else {
        return hardware_concurrency();
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!(
                value = raw,
                "ignoring {NUM_THREADS_ENV}: expected a positive integer"
            );
            hardware_concurrency()
        }
    }
}
