// Async runtime for the binary

use std::future::Future;

/// Run `future` to completion on a fresh multi-threaded runtime.
///
/// Blocking work a timed-out segment left behind (a slow repository
/// status, for instance) is abandoned at shutdown instead of awaited. The
/// shell hook waits for this process to exit, so exit must not depend on
/// anything past the render deadline.
pub fn block_on_detached<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}
