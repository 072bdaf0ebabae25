use log::debug;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::sync::OnceCell;
use tokio::task::JoinError;

static GLOBAL_RUNTIME: OnceCell<Runtime> = OnceCell::const_new();

/// Runtime that owns every task started from foreign callers, including the
/// session timers. Built on first use.
pub async fn global_runtime() -> std::io::Result<&'static Runtime> {
    GLOBAL_RUNTIME
        .get_or_try_init(async || {
            let threads = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            let threads = std::cmp::max(threads, 2);
            debug!("Initializing global runtime with {} threads", threads);
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(threads)
                .enable_all()
                .build()
        })
        .await
}

/// Run `fut` on the global runtime and wait for it from whatever executor
/// the caller polls on.
pub async fn run_on<F>(runtime: &'static Runtime, fut: F) -> Result<F::Output, JoinError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    runtime.spawn(fut).await
}
