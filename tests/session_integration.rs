//! End-to-end session tests over the synthetic projection source.
//!
//! Timing-sensitive assertions use generous bounds so they hold on loaded
//! CI machines.

use std::sync::Arc;
use std::time::Duration;

use mirror_capture::capture::{FramePattern, SyntheticSource};
use mirror_capture::{CaptureConfig, CaptureSession, Region};

#[tokio::test]
async fn test_continuous_capture_gates_to_requested_fps() {
    // Source produces ~50fps for half a second; at 10fps the session should
    // accept roughly one frame per 100ms.
    let source = Arc::new(
        SyntheticSource::new(64, 48)
            .with_interval(Duration::from_millis(20))
            .with_frame_budget(25),
    );
    let session = CaptureSession::new(source.clone());

    let mut rx = session
        .start(CaptureConfig::new().with_fps(10))
        .await
        .unwrap();

    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    assert!(
        (3..=8).contains(&results.len()),
        "expected 3..=8 gated frames, got {}",
        results.len()
    );
    for pair in results.windows(2) {
        assert!(pair[1].time >= pair[0].time);
        assert!(pair[1].queue > pair[0].queue);
    }
    assert_eq!(results[0].queue, 1);
    assert_eq!(results[0].width, 64);
    assert_eq!(results[0].height, 48);
    assert_eq!(results[0].planar_yuv.len(), 64 * 48 * 3 / 2);

    session.stop().await;
    assert!(!session.is_running());

    // Gate-rejected frames (the large majority at this rate) must release
    // back to the pool just like accepted ones.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.in_flight(), 0);
}

#[tokio::test]
async fn test_unthrottled_session_delivers_every_frame() {
    let source = Arc::new(
        SyntheticSource::new(16, 16)
            .with_interval(Duration::from_millis(5))
            .with_frame_budget(10),
    );
    let session = CaptureSession::new(source);

    // fps 0 disables the gate entirely.
    let mut rx = session.start(CaptureConfig::new().with_fps(0)).await.unwrap();
    let mut count = 0;
    while rx.recv().await.is_some() {
        count += 1;
    }
    assert_eq!(count, 10);
    session.stop().await;
}

#[tokio::test]
async fn test_sequence_is_monotonic_across_modes() {
    let source = Arc::new(SyntheticSource::new(32, 32).with_interval(Duration::from_millis(5)));
    let session = CaptureSession::new(source);

    let single = session.take_capture(None).await.unwrap();
    assert_eq!(single.queue, 1);

    let mut rx = session.start(CaptureConfig::new().with_fps(0)).await.unwrap();
    let mut last = single.queue;
    for _ in 0..3 {
        let result = rx.recv().await.unwrap();
        assert!(result.queue > last);
        last = result.queue;
    }
    session.stop().await;

    let after = session.take_capture(None).await.unwrap();
    assert!(after.queue > last);
}

#[tokio::test]
async fn test_second_start_is_rejected() {
    let source = Arc::new(SyntheticSource::new(8, 8));
    let session = CaptureSession::new(source);

    let _rx = session.start(CaptureConfig::new()).await.unwrap();
    let err = session.start(CaptureConfig::new()).await.unwrap_err();
    assert_eq!(err.category(), "already_running");

    session.stop().await;

    // Idle again; a fresh start succeeds.
    let _rx = session.start(CaptureConfig::new()).await.unwrap();
    session.stop().await;
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let source = Arc::new(SyntheticSource::new(8, 8));
    let session = CaptureSession::new(source);

    // Stopping an idle session still reports success.
    assert!(session.stop().await);

    let _rx = session.start(CaptureConfig::new()).await.unwrap();
    assert!(session.stop().await);
    assert!(session.stop().await);
    assert!(!session.is_running());
}

#[tokio::test]
async fn test_unauthorized_source_rejects_both_modes() {
    let source = Arc::new(SyntheticSource::unauthorized(8, 8));
    let session = CaptureSession::new(source);

    let err = session.start(CaptureConfig::new()).await.unwrap_err();
    assert_eq!(err.category(), "source_not_ready");

    let err = session.take_capture(None).await.unwrap_err();
    assert_eq!(err.category(), "source_not_ready");
}

#[tokio::test]
async fn test_take_capture_times_out_without_frames() {
    // Zero budget: the feed opens but never produces.
    let source = Arc::new(SyntheticSource::new(8, 8).with_frame_budget(0));
    let session = CaptureSession::new(source);

    let err = session.take_capture(None).await.unwrap_err();
    assert_eq!(err.category(), "no_frame_available");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_take_capture_with_region_reports_cropped_dimensions() {
    let source = Arc::new(
        SyntheticSource::new(120, 80)
            .with_row_padding(8)
            .with_pattern(FramePattern::Gradient),
    );
    let session = CaptureSession::new(source.clone());

    let result = session
        .take_capture(Some(Region::new(10, 10, 40, 20)))
        .await
        .unwrap();

    assert_eq!(result.width, 40);
    assert_eq!(result.height, 20);
    assert_eq!(result.row_bytes, 40 * 4);
    assert_eq!(result.planar_yuv.len(), 40 * 20 * 3 / 2);
    // Raw strides come from the source buffer, padding included.
    assert_eq!(result.pixel_stride, 4);
    assert_eq!(result.row_stride, (120 + 8) * 4);
    assert_eq!(result.format, "RGBA_8888");

    let decoded = image::load_from_memory(&result.bytes).unwrap();
    assert_eq!(decoded.width(), 40);
    assert_eq!(decoded.height(), 20);

    assert_eq!(source.in_flight(), 0);
}

#[tokio::test]
async fn test_revocation_ends_running_session() {
    let source = Arc::new(SyntheticSource::new(16, 16).with_interval(Duration::from_millis(5)));
    let revoke = source.revoke_handle();
    let session = CaptureSession::new(source.clone());

    let mut rx = session.start(CaptureConfig::new().with_fps(0)).await.unwrap();
    assert!(rx.recv().await.is_some());

    revoke.revoke();
    // Queued frames may still drain; the channel then closes.
    while rx.recv().await.is_some() {}

    session.stop().await;
    assert!(!session.is_running());

    // A revoked source is no longer ready for a new session.
    let err = session.start(CaptureConfig::new()).await.unwrap_err();
    assert_eq!(err.category(), "source_not_ready");
}

#[tokio::test]
async fn test_all_frames_released_after_stop() {
    let source = Arc::new(SyntheticSource::new(32, 32).with_interval(Duration::from_millis(5)));
    let session = CaptureSession::new(source.clone());

    let mut rx = session.start(CaptureConfig::new().with_fps(0)).await.unwrap();
    for _ in 0..5 {
        assert!(rx.recv().await.is_some());
    }
    session.stop().await;
    drop(rx);

    // Give in-transit guards a moment to drop.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.in_flight(), 0);
}

#[tokio::test]
async fn test_invalid_config_rejected_before_feed_opens() {
    let source = Arc::new(SyntheticSource::new(8, 8));
    let session = CaptureSession::new(source);

    let err = session
        .start(CaptureConfig::new().with_fps(100_000))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "config");
    assert!(!session.is_running());

    let err = session
        .take_capture(Some(Region::new(0, 0, 0, 10)))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "config");
}
