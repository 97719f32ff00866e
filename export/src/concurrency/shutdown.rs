use tokio::sync::watch;

use crate::concurrency::signal::{create_signal, SignalRx, SignalTx};

/// Handle for requesting cooperative shutdown of a running pipeline.
///
/// The stop signal is observed between batches, never mid-batch, so the
/// pipeline can attempt a final flush and checkpoint before exiting.
#[derive(Debug, Clone)]
pub struct ShutdownTx(SignalTx);

impl ShutdownTx {
    pub fn wrap(tx: SignalTx) -> Self {
        Self(tx)
    }

    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

pub type ShutdownRx = SignalRx;

pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = create_signal();
    (ShutdownTx::wrap(tx), rx)
}
