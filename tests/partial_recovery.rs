//! Degraded reception: gaps, partial reconstruction, and expired windows.

use std::{
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

use opticast::{
    Assembler,
    DiscardStore,
    Expiration,
    Lifecycle,
    LifecycleStage,
    LogicalPayload,
    OpenError,
    Splitter,
    TransferTag,
    TransferWindow,
    payload,
};

const GRACE: Duration = Duration::from_millis(600);

#[test]
fn text_survives_a_transfer_that_never_finishes() {
    let sent = LogicalPayload::new("the gist arrives first", Expiration::ReadOnce)
        .with_created_at_ms(3)
        .with_image(vec![0x42_u8; 300]);
    let bytes = payload::encode(&sent).expect("encode payload");

    let splitter = Splitter::new(NonZeroUsize::new(32).expect("non-zero"));
    let batch = splitter.split(TransferTag::Direct, &bytes).expect("split payload");
    let frames = batch.fragments();
    assert!(frames.len() > 3);

    let mut assembler = Assembler::new(NonZeroUsize::new(4096).expect("non-zero"));
    // The camera caught the first two codes and one from deep in the image,
    // then the sender walked away.
    assembler.ingest(*frames[0].header(), frames[0].payload());
    assembler.ingest(*frames[1].header(), frames[1].payload());
    let last = frames.len() - 1;
    assembler.ingest(*frames[last].header(), frames[last].payload());

    assert!(!assembler.is_complete());
    let partial = assembler.partial_reconstruct().expect("descriptor present");
    assert_eq!(partial.text(), Some("the gist arrives first"));
    assert_eq!(partial.expiration(), Expiration::ReadOnce);
    // The image cannot be salvaged across the gap.
    assert!(partial.image().is_none());
}

#[test]
fn nothing_recoverable_before_the_first_fragment_lands() {
    let sent = LogicalPayload::new("tail only", Expiration::Permanent).with_created_at_ms(0);
    let bytes = payload::encode(&sent).expect("encode payload");
    let splitter = Splitter::new(NonZeroUsize::new(8).expect("non-zero"));
    let batch = splitter.split(TransferTag::Direct, &bytes).expect("split payload");
    let frames = batch.fragments();

    let mut assembler = Assembler::new(NonZeroUsize::new(4096).expect("non-zero"));
    for frame in &frames[1..] {
        assembler.ingest(*frame.header(), frame.payload());
    }

    // Everything but index 0: plenty of data, no usable prefix.
    assert!(assembler.partial_reconstruct().is_none());

    // The missing head then arrives and the transfer completes.
    assembler.ingest(*frames[0].header(), frames[0].payload());
    assert_eq!(assembler.finalize().expect("decode payload"), sent);
}

#[test]
fn window_expiry_locks_an_assembled_message() {
    let sent = LogicalPayload::new("scan me quickly", Expiration::ReadOnce)
        .with_created_at_ms(0)
        .with_window(TransferWindow::new(10_000));
    let bytes = payload::encode(&sent).expect("encode payload");
    let splitter = Splitter::new(NonZeroUsize::new(16).expect("non-zero"));
    let batch = splitter.split(TransferTag::Direct, &bytes).expect("split payload");

    // Assembled in time...
    let mut assembler = Assembler::new(NonZeroUsize::new(4096).expect("non-zero"));
    for frame in batch.fragments() {
        assembler.ingest_at(*frame.header(), frame.payload(), 5_000);
    }
    let received = assembler.finalize().expect("decode payload");

    // ...but handed to the viewer after the deadline: locked, never openable.
    let mut lifecycle =
        Lifecycle::on_assembled_at(received, Arc::new(DiscardStore), GRACE, 20_000);
    assert_eq!(lifecycle.poll_at(Instant::now()), LifecycleStage::WindowLocked);
    assert_eq!(lifecycle.open_at(Instant::now()), Err(OpenError::WindowLocked));
    assert!(lifecycle.payload().is_none());
}

#[test]
fn window_expiry_mid_transfer_stops_ingestion() {
    let sent = LogicalPayload::new("half scanned", Expiration::ReadOnce)
        .with_created_at_ms(0)
        .with_window(TransferWindow::new(10_000));
    let bytes = payload::encode(&sent).expect("encode payload");
    // Capacity 20 keeps the whole leading descriptor inside fragment 0.
    let splitter = Splitter::new(NonZeroUsize::new(20).expect("non-zero"));
    let batch = splitter.split(TransferTag::Direct, &bytes).expect("split payload");
    let frames = batch.fragments();
    assert!(frames.len() >= 3);

    let mut assembler = Assembler::new(NonZeroUsize::new(4096).expect("non-zero"));
    // Fragment 0 carries the descriptor; the assembler adopts the window.
    assembler.ingest_at(*frames[0].header(), frames[0].payload(), 5_000);
    assert_eq!(assembler.window(), Some(TransferWindow::new(10_000)));

    let received_before = assembler.received_count();
    for frame in &frames[1..] {
        let outcome = assembler.ingest_at(*frame.header(), frame.payload(), 15_000);
        assert!(outcome.is_rejected());
    }
    assert_eq!(assembler.received_count(), received_before);
    assert!(!assembler.is_complete());
}
