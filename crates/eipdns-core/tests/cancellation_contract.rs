//! Contract Test: Cancellation
//!
//! Constraints verified:
//! - A token cancelled up front prevents any backend mutation
//! - Cancelling mid-flight unblocks promptly instead of waiting for the
//!   remaining zones/targets
//! - Cancellation is the one error apply_changes surfaces

mod common;

use common::*;
use eipdns_core::{CancellationToken, Changes, Endpoint, Error, Provider, RawRecord, RecordType};
use std::time::Duration;

#[tokio::test]
async fn cancelled_token_prevents_mutations() {
    let provider = provider_with(RecordingBackend::new(), test_config());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let changes = Changes {
        create: vec![Endpoint::new("a.example.com", RecordType::A, ["1.1.1.1"])],
        ..Changes::default()
    };
    let result = provider.apply_changes(&cancel, changes).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(provider.backend().calls().is_empty());
}

#[tokio::test]
async fn cancelled_token_fails_records() {
    let backend = RecordingBackend::new().with_zone("example.com", "1", Vec::new());
    let provider = provider_with(backend, test_config());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = provider.records(&cancel).await;

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn cancel_unblocks_slow_apply() {
    let backend = RecordingBackend::new().with_delay(Duration::from_secs(30));
    let provider = provider_with(backend, test_config());
    let cancel = CancellationToken::new();

    let changes = Changes {
        create: vec![Endpoint::new(
            "a.example.com",
            RecordType::A,
            ["1.1.1.1", "2.2.2.2", "3.3.3.3"],
        )],
        ..Changes::default()
    };

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        provider.apply_changes(&cancel, changes),
    )
    .await
    .expect("apply_changes returns promptly after cancellation");

    assert!(matches!(result, Err(Error::Cancelled)));
    // Only the in-flight call was started
    assert_eq!(provider.backend().mutations().len(), 1);
}

#[tokio::test]
async fn cancel_unblocks_slow_listing() {
    let backend = RecordingBackend::new()
        .with_zone(
            "example.com",
            "1",
            vec![RawRecord::new("a.example.com", "A", "300", "1.1.1.1")],
        )
        .with_delay(Duration::from_secs(30));
    let provider = provider_with(backend, test_config());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), provider.records(&cancel))
        .await
        .expect("records returns promptly after cancellation");

    assert!(matches!(result, Err(Error::Cancelled)));
}
