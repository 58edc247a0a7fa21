use anyhow::{Result, bail};
use async_channel::{Receiver, Sender};
use futures::executor::block_on;

use crate::pending::{FutureStatus, PendingBase};

/// Blocks a sequential caller until a pending operation completes.
///
/// Every instance owns its own notification channel, so unrelated waits
/// never wake each other.
pub struct AwaitableCompletion<'f> {
    future: &'f dyn PendingBase,
    invoked: Receiver<()>,
}

impl<'f> AwaitableCompletion<'f> {
    pub fn new(future: &'f dyn PendingBase) -> AwaitableCompletion<'f> {
        let (tx, rx) = async_channel::bounded(1);
        future.on_completion(Box::new(move || notify(&tx)));

        AwaitableCompletion {
            future,
            invoked: rx,
        }
    }

    pub fn await_invoked(&self) -> Result<()> {
        block_on(async {
            while self.future.status() == FutureStatus::Pending {
                if self.invoked.recv().await.is_err() {
                    // The sender went away with the callback, which was
                    // replaced before it could fire.
                    if self.future.status() == FutureStatus::Pending {
                        bail!("completion callback discarded while operation still pending");
                    }
                }
            }

            Ok(())
        })
    }
}

fn notify(tx: &Sender<()>) {
    // Capacity one; a full channel already carries the wakeup.
    let _ = tx.try_send(());
}
