//! Cooperative-shutdown forwarding task (§6), mirroring the bounded-channel
//! producer-with-shutdown shape used throughout this pipeline.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc};
use tracing::{debug, warn};

use crate::FrameEnvelope;
use crate::gate::FrameGate;

#[derive(Clone, Debug)]
pub struct FrameIngestShutdown {
    notify: Arc<Notify>,
}

impl FrameIngestShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

/// Forward frames from `inbound` to `outbound`, gating each through a
/// [`FrameGate`], until `inbound` closes or shutdown is signaled.
pub fn spawn_frame_ingest(
    mut inbound: mpsc::Receiver<FrameEnvelope>,
    outbound: mpsc::Sender<FrameEnvelope>,
) -> (tokio::task::JoinHandle<()>, FrameIngestShutdown) {
    let notify = Arc::new(Notify::new());
    let shutdown = FrameIngestShutdown {
        notify: notify.clone(),
    };

    let handle = tokio::task::spawn(async move {
        let mut gate = FrameGate::new();
        loop {
            tokio::select! {
                biased;
                _ = notify.notified() => {
                    debug!(target: "core_input", "frame ingest task received shutdown signal");
                    break;
                }
                received = inbound.recv() => {
                    match received {
                        None => {
                            debug!(target: "core_input", "frame ingest task: inbound channel closed");
                            break;
                        }
                        Some(envelope) => {
                            gate.observe(envelope.side, &envelope.frame);
                            if outbound.send(envelope).await.is_err() {
                                warn!(target: "core_input", "frame ingest task: outbound receiver dropped");
                                break;
                            }
                        }
                    }
                }
            }
        }
    });

    (handle, shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{Contact, ContactFlags, Frame, Side};

    fn frame_at(ticks: i64) -> Frame {
        let mut f = Frame::new(ticks, 0, 0, 100, 100);
        f.push_contact(Contact::new(1, 10, 10, ContactFlags::TIP));
        f
    }

    #[tokio::test(flavor = "current_thread")]
    async fn forwards_accepted_frames_and_stops_on_shutdown() {
        let (tx_in, rx_in) = mpsc::channel(8);
        let (tx_out, mut rx_out) = mpsc::channel(8);
        let (handle, shutdown) = spawn_frame_ingest(rx_in, tx_out);

        tx_in
            .send(FrameEnvelope::new(Side::Right, frame_at(1)))
            .await
            .unwrap();
        let got = rx_out.recv().await.unwrap();
        assert_eq!(got.frame.arrival_ticks, 1);

        shutdown.signal();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn forwards_non_monotonic_frames_under_capture_policy() {
        let (tx_in, rx_in) = mpsc::channel(8);
        let (tx_out, mut rx_out) = mpsc::channel(8);
        let (handle, shutdown) = spawn_frame_ingest(rx_in, tx_out);

        tx_in.send(FrameEnvelope::new(Side::Right, frame_at(20))).await.unwrap();
        tx_in.send(FrameEnvelope::new(Side::Right, frame_at(10))).await.unwrap();
        assert_eq!(rx_out.recv().await.unwrap().frame.arrival_ticks, 20);
        assert_eq!(rx_out.recv().await.unwrap().frame.arrival_ticks, 10);

        shutdown.signal();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stops_when_inbound_closes() {
        let (tx_in, rx_in) = mpsc::channel(8);
        let (tx_out, _rx_out) = mpsc::channel(8);
        let (handle, _shutdown) = spawn_frame_ingest(rx_in, tx_out);
        drop(tx_in);
        handle.await.unwrap();
    }
}
