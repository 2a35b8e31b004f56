use tokio::runtime::{Handle, RuntimeFlavor};

/// Run CPU-bound work such as model inference without stalling other tasks.
///
/// On a multi-threaded runtime the worker hands its queue to another thread
/// first; elsewhere (current-thread runtimes, plain threads) `f` runs inline.
pub(crate) fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
        _ => f(),
    }
}
