use crate::{Error, Result};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Install a ctrl-c/SIGTERM handler that flips the running flag instead of exiting.
pub(super) fn create_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_handle = running.clone();

    ctrlc::set_handler(move || {
        log::info!("shutdown requested");
        running_handle.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(running)
}
