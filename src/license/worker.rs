use crate::license::error::LicenseError;
use crate::license::gate::{CheckOutcome, LicenseGate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Shared flag set when the registration dialog is dismissed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRequest {
    Check,
    Activate(String),
}

#[derive(Debug)]
pub enum GateReport {
    Checked(CheckOutcome),
    Activated(Result<(), LicenseError>),
}

/// A gate operation running off the UI thread.
pub struct GateTask {
    rx: Receiver<GateReport>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

pub fn spawn(gate: Arc<LicenseGate>, request: GateRequest) -> std::io::Result<GateTask> {
    let (tx, rx) = channel();
    let cancel = CancelToken::default();
    let worker_cancel = cancel.clone();
    let handle = std::thread::Builder::new()
        .name("license-gate".into())
        .spawn(move || {
            let report = match request {
                GateRequest::Check => GateReport::Checked(gate.check()),
                GateRequest::Activate(token) => GateReport::Activated(
                    gate.activate_and_store_unless(&token, || worker_cancel.is_cancelled()),
                ),
            };
            if worker_cancel.is_cancelled() {
                tracing::debug!("gate result discarded after cancellation");
                return;
            }
            let _ = tx.send(report);
        })?;
    Ok(GateTask {
        rx,
        cancel,
        handle: Some(handle),
    })
}

impl GateTask {
    /// Non-blocking poll. A worker that died without reporting surfaces as a
    /// network failure so the dialog can retry.
    pub fn try_report(&mut self) -> Option<GateReport> {
        match self.rx.try_recv() {
            Ok(report) => {
                self.join();
                Some(report)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(GateReport::Activated(Err(LicenseError::Network(
                    "verification worker stopped".into(),
                ))))
            }
        }
    }

    pub fn wait(&mut self, timeout: Duration) -> Option<GateReport> {
        match self.rx.recv_timeout(timeout) {
            Ok(report) => {
                self.join();
                Some(report)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
