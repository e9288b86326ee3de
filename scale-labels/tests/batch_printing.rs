// scale-labels/tests/batch_printing.rs
// Store → render → dispatch, against loopback printers

use scale_labels::{PrintDispatcher, PrinterAddress, Scale, ScaleStorage};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Loopback printer collecting every received document
async fn start_printer() -> (PrinterAddress, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut received = String::new();
            if socket.read_to_string(&mut received).await.is_ok() {
                let _ = tx.send(received);
            }
        }
    });

    (PrinterAddress::new("127.0.0.1", port).unwrap(), rx)
}

fn unreachable_printer() -> PrinterAddress {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    PrinterAddress::new("127.0.0.1", port).unwrap()
}

fn seeded_storage(dir: &TempDir) -> ScaleStorage {
    let storage = ScaleStorage::open(dir.path().join("scales.redb")).unwrap();
    storage.create_store("Loja Centro").unwrap();
    storage
        .save_scale(&Scale::new("Loja Centro", 12, "Padaria", None))
        .unwrap();
    storage
        .save_scale(&Scale::new(
            "Loja Centro",
            3,
            "Açougue",
            Some("Model:X\nSN:123".to_string()),
        ))
        .unwrap();
    storage
}

#[tokio::test]
async fn test_store_batch_prints_in_scale_order() {
    let dir = TempDir::new().unwrap();
    let storage = seeded_storage(&dir);
    let (printer, mut rx) = start_printer().await;

    let records: Vec<_> = storage
        .list_scales("Loja Centro")
        .unwrap()
        .iter()
        .map(|s| s.to_label_record(2).unwrap())
        .collect();

    let result = PrintDispatcher::new()
        .send_batch(|_| printer.clone(), &records, 2)
        .await;

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 0);
    assert_eq!(result.outcomes[0].scale_number, 3);
    assert_eq!(result.outcomes[1].scale_number, 12);

    // Sequential batch: the printer sees the labels in the same order
    let first = rx.recv().await.unwrap();
    assert!(first.contains("^FDQA,Model:X_0D_0ASN:123^FS"));
    assert!(first.contains("^FDAçougue^FS"));
    assert!(first.contains("^PQ2\n"));

    let second = rx.recv().await.unwrap();
    assert!(second.contains("^FDQA,Scale:12|Dept:Padaria^FS"));
    assert_eq!(second.matches("^PQ").count(), 1);
}

#[tokio::test]
async fn test_partial_failure_keeps_going() {
    let dir = TempDir::new().unwrap();
    let storage = seeded_storage(&dir);
    let (printer, _rx) = start_printer().await;
    let dead = unreachable_printer();

    let records: Vec<_> = storage
        .list_scales("Loja Centro")
        .unwrap()
        .iter()
        .map(|s| s.to_label_record(1).unwrap())
        .collect();

    // First label goes to a dead printer, the second must still be sent
    let result = PrintDispatcher::new()
        .send_batch(
            |r| {
                if r.scale_number() == 3 {
                    dead.clone()
                } else {
                    printer.clone()
                }
            },
            &records,
            1,
        )
        .await;

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.succeeded + result.failed, result.outcomes.len());

    let failure = &result.outcomes[0];
    assert!(!failure.success);
    assert!(failure.message.contains(&dead.to_string()));
    assert!(result.outcomes[1].success);
    assert_eq!(result.outcomes[1].message, "OK");
}

#[tokio::test]
async fn test_storage_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let storage = seeded_storage(&dir);
        assert_eq!(storage.clear_store("Loja Centro").unwrap(), 2);
        storage
            .save_scale(&Scale::new("Loja Centro", 7, "PAS", None))
            .unwrap();
    }

    let storage = ScaleStorage::open(dir.path().join("scales.redb")).unwrap();
    let scales = storage.list_scales("Loja Centro").unwrap();
    assert_eq!(scales.len(), 1);
    assert_eq!(scales[0].number, 7);
    // Seeding only happens on an empty department table
    assert_eq!(storage.list_departments().unwrap().len(), 8);
}
