use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;

static GLOBAL_RAYON_THREADS: OnceCell<usize> = OnceCell::new();

/// Configure the global Rayon thread pool exactly once, returning the active
/// worker count. Subsequent calls reuse the first configured pool and emit a
/// warning when the requested thread count differs from the established size.
pub fn configure_global_thread_pool(threads: Option<usize>) -> Result<usize> {
    let requested = match threads {
        Some(0) => return Err(anyhow!("must select > 0 threads")),
        Some(n) => n,
        None => num_cpus::get(),
    };

    if let Some(active) = GLOBAL_RAYON_THREADS.get() {
        if *active != requested {
            log::warn!(
                "Rayon global thread pool already initialised with {} threads; ignoring request for {}",
                active,
                requested
            );
        }
        return Ok(*active);
    }

    match ThreadPoolBuilder::new().num_threads(requested).build_global() {
        Ok(_) => {
            GLOBAL_RAYON_THREADS
                .set(requested)
                .map_err(|_| anyhow!("failed to record global Rayon thread count"))?;
            Ok(requested)
        }
        Err(err) => {
            // The pool was likely initialised elsewhere; fall back to the current size.
            log::debug!("global Rayon thread pool initialisation skipped: {}", err);
            let fallback = rayon::current_num_threads();
            if fallback != requested {
                log::warn!(
                    "using existing Rayon pool with {} threads instead of requested {}",
                    fallback,
                    requested
                );
            }
            GLOBAL_RAYON_THREADS.set(fallback).ok();
            Ok(fallback)
        }
    }
}
