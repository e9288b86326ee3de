//! Print dispatcher
//!
//! Sends rendered labels to network printers and keeps per-item accounting
//! across a batch.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use zpl_printer::{DEFAULT_TIMEOUT, NetworkPrinter, Printer, PrinterAddress};

use super::renderer::ScaleLabelRenderer;
use super::types::{
    BatchResult, LabelRecord, PrintOutcome, PrintProgress, RenderedDocument, SendReport,
};
use crate::core::Config;

/// Message recorded for records skipped after cancellation
pub const CANCELLED_MESSAGE: &str = "Cancelled before dispatch";

/// Print dispatcher
///
/// One short-lived connection per label, no retries. Batches always attempt
/// every record and report each outcome in input order.
#[derive(Debug, Clone)]
pub struct PrintDispatcher {
    renderer: ScaleLabelRenderer,
    timeout: Duration,
    concurrency: usize,
}

impl PrintDispatcher {
    /// Sequential dispatcher with the default connect timeout (2s)
    pub fn new() -> Self {
        Self {
            renderer: ScaleLabelRenderer::default(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: 1,
        }
    }

    /// Dispatcher configured from the environment config
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_timeout(config.printer_timeout())
            .with_concurrency(config.print_concurrency)
    }

    pub fn with_renderer(mut self, renderer: ScaleLabelRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of labels in flight at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn renderer(&self) -> &ScaleLabelRenderer {
        &self.renderer
    }

    /// Send one document
    ///
    /// Transport errors come back as a failed report carrying the error text.
    #[instrument(skip(self, document), fields(addr = %address, bytes = document.as_bytes().len()))]
    pub async fn send(&self, address: &PrinterAddress, document: &RenderedDocument) -> SendReport {
        let printer = NetworkPrinter::with_address(address.clone()).with_timeout(self.timeout);

        match printer.print(document.as_bytes()).await {
            Ok(()) => SendReport::ok(),
            Err(e) => {
                warn!(error = %e, "Label send failed");
                SendReport::failed(e.to_string())
            }
        }
    }

    /// Check if a printer accepts connections
    pub async fn is_online(&self, address: &PrinterAddress) -> bool {
        NetworkPrinter::with_address(address.clone())
            .is_online()
            .await
    }

    /// Print every record with `copies` copies each
    ///
    /// `address_fn` picks the printer for each record.
    pub async fn send_batch<F>(
        &self,
        address_fn: F,
        records: &[LabelRecord],
        copies: u32,
    ) -> BatchResult
    where
        F: Fn(&LabelRecord) -> PrinterAddress,
    {
        self.send_batch_with_progress(address_fn, records, copies, None, &CancellationToken::new())
            .await
    }

    /// Print every record, publishing progress as items complete
    ///
    /// Cancellation is checked before each record is dispatched; records not
    /// yet started are reported as failed with [`CANCELLED_MESSAGE`].
    #[instrument(skip_all, fields(total = records.len(), copies = copies))]
    pub async fn send_batch_with_progress<F>(
        &self,
        address_fn: F,
        records: &[LabelRecord],
        copies: u32,
        progress: Option<mpsc::UnboundedSender<PrintProgress>>,
        cancel: &CancellationToken,
    ) -> BatchResult
    where
        F: Fn(&LabelRecord) -> PrinterAddress,
    {
        let total = records.len();
        info!(concurrency = self.concurrency, "Starting label batch");

        // buffered() keeps input order while up to `concurrency` sends run
        let mut sends = futures::stream::iter(records.iter().enumerate())
            .map(|(index, record)| {
                let address = address_fn(record);
                async move {
                    if cancel.is_cancelled() {
                        let report = SendReport::failed(CANCELLED_MESSAGE);
                        return (to_outcome(index, record, &address, report), false);
                    }

                    let document = self.renderer.render_with_copies(record, copies);
                    let report = self.send(&address, &document).await;
                    (to_outcome(index, record, &address, report), true)
                }
            })
            .buffered(self.concurrency);

        let mut outcomes = Vec::with_capacity(total);
        let mut skipped = 0usize;

        while let Some((outcome, attempted)) = sends.next().await {
            if !attempted {
                skipped += 1;
            }

            if let Some(tx) = &progress {
                // Receiver may be gone; the batch still runs to the end
                let _ = tx.send(PrintProgress {
                    completed: outcomes.len() + 1,
                    total,
                    outcome: outcome.clone(),
                });
            }

            outcomes.push(outcome);
        }

        let result = BatchResult::from_outcomes(outcomes, skipped > 0);

        if result.cancelled {
            warn!(skipped, "Label batch cancelled");
        }
        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            "Label batch finished"
        );

        result
    }
}

impl Default for PrintDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn to_outcome(
    index: usize,
    record: &LabelRecord,
    address: &PrinterAddress,
    report: SendReport,
) -> PrintOutcome {
    PrintOutcome {
        index,
        scale_number: record.scale_number(),
        department_name: record.department_name().to_string(),
        printer: address.to_string(),
        success: report.success,
        message: report.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Accepts connections forever and forwards each received document
    async fn printer_sink() -> (PrinterAddress, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut received = String::new();
                    if socket.read_to_string(&mut received).await.is_ok() {
                        let _ = tx.send(received);
                    }
                });
            }
        });

        (PrinterAddress::new("127.0.0.1", port).unwrap(), rx)
    }

    /// Address of a port nobody listens on
    fn closed_port() -> PrinterAddress {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        PrinterAddress::new("127.0.0.1", port).unwrap()
    }

    fn records(n: u32) -> Vec<LabelRecord> {
        (1..=n)
            .map(|i| LabelRecord::new(i, "Padaria", 1, None).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_send_ok() {
        let (addr, mut rx) = printer_sink().await;
        let dispatcher = PrintDispatcher::new();
        let record = LabelRecord::new(12, "Padaria", 2, None).unwrap();
        let document = dispatcher.renderer().render(&record);

        let report = dispatcher.send(&addr, &document).await;
        assert_eq!(report, SendReport::ok());

        let received = rx.recv().await.unwrap();
        assert_eq!(received, document.as_str());
    }

    #[tokio::test]
    async fn test_send_refused() {
        let dispatcher = PrintDispatcher::new();
        let record = LabelRecord::new(1, "PAS", 1, None).unwrap();
        let document = dispatcher.renderer().render(&record);

        let report = dispatcher.send(&closed_port(), &document).await;
        assert!(!report.success);
        assert!(!report.message.is_empty());
        assert_ne!(report.message, "OK");
    }

    #[tokio::test]
    async fn test_batch_one_good_one_bad() {
        let (good, _rx) = printer_sink().await;
        let bad = closed_port();
        let records = records(2);

        let result = PrintDispatcher::new()
            .send_batch(
                |r| if r.scale_number() == 1 { good.clone() } else { bad.clone() },
                &records,
                1,
            )
            .await;

        assert_eq!(result.total, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert!(result.outcomes[0].success);
        assert!(!result.outcomes[1].success);
        assert!(!result.cancelled);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let result = PrintDispatcher::new()
            .send_batch(|_| closed_port(), &[], 1)
            .await;

        assert_eq!(result, BatchResult::default());
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let (good, mut rx) = printer_sink().await;
        let bad = closed_port();
        let records = records(5);

        let result = PrintDispatcher::new()
            .send_batch(
                |r| if r.scale_number() % 2 == 0 { bad.clone() } else { good.clone() },
                &records,
                3,
            )
            .await;

        assert_eq!(result.total, 5);
        assert_eq!(result.succeeded, 3);
        assert_eq!(result.failed, 2);
        for (i, outcome) in result.outcomes.iter().enumerate() {
            assert_eq!(outcome.index, i);
            assert_eq!(outcome.scale_number, i as u32 + 1);
        }

        for _ in 0..3 {
            let doc = rx.recv().await.unwrap();
            assert!(doc.contains("^PQ3\n"));
        }
    }

    #[tokio::test]
    async fn test_concurrent_batch_keeps_order() {
        let (good, mut rx) = printer_sink().await;
        let records = records(8);

        let result = PrintDispatcher::new()
            .with_concurrency(4)
            .send_batch(|_| good.clone(), &records, 1)
            .await;

        assert_eq!(result.succeeded, 8);
        let numbers: Vec<u32> = result.outcomes.iter().map(|o| o.scale_number).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<_>>());

        let mut received = 0;
        while received < 8 {
            rx.recv().await.unwrap();
            received += 1;
        }
    }

    #[tokio::test]
    async fn test_progress_in_order() {
        let (good, _rx) = printer_sink().await;
        let records = records(3);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = PrintDispatcher::new()
            .send_batch_with_progress(
                |_| good.clone(),
                &records,
                1,
                Some(tx),
                &CancellationToken::new(),
            )
            .await;

        let mut seen = Vec::new();
        while let Some(progress) = rx.recv().await {
            assert_eq!(progress.total, 3);
            seen.push((progress.completed, progress.outcome.index));
        }
        assert_eq!(seen, vec![(1, 0), (2, 1), (3, 2)]);
        assert_eq!(result.succeeded, 3);
    }

    #[tokio::test]
    async fn test_cancelled_batch_reports_every_record() {
        let (good, _rx) = printer_sink().await;
        let records = records(4);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = PrintDispatcher::new()
            .send_batch_with_progress(|_| good.clone(), &records, 1, None, &cancel)
            .await;

        assert!(result.cancelled);
        assert_eq!(result.total, 4);
        assert_eq!(result.failed, 4);
        assert!(result.outcomes.iter().all(|o| o.message == CANCELLED_MESSAGE));
    }

    #[tokio::test]
    async fn test_is_online() {
        let (good, _rx) = printer_sink().await;
        let dispatcher = PrintDispatcher::new();
        assert!(dispatcher.is_online(&good).await);
        assert!(!dispatcher.is_online(&closed_port()).await);
    }
}
