use crate::domain::outcome::PaymentProgress;
use tokio::sync::mpsc;
use tracing::debug;

/// Fan-out point for progress notifications of a single payment.
///
/// Sending never blocks and never fails the payment: a dropped receiver just
/// means nobody is watching any more.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<PaymentProgress>>,
}

impl ProgressReporter {
    pub fn new(sender: mpsc::UnboundedSender<PaymentProgress>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// A reporter that only logs.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PaymentProgress>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    pub fn emit(&self, event: PaymentProgress) {
        debug!(%event, "payment progress");
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
