use std::sync::Arc;
use std::time::Duration;

use articast::config::{PlayerConfig, PlayerSettings};
use articast::models::QualityTier;
use articast::player::capabilities::{DeviceProfile, StaticCapabilities};
use articast::player::error::{MediaError, MediaErrorKind, PlayError};
use articast::player::traits::{MediaEvent, PlayerState};
use articast::player::{DurationSource, PlaybackController, PlayerHandle};

use crate::common::builders::{RAW_MEDIA_URL, TrackBuilder};
use crate::common::mocks::{MockMediaElement, RecordingTrackApi};

const HIGH_URL: &str = "https://res.cloudinary.com/demo/video/upload/\
                        q_auto:best,br_48k,ar_44100,ac_2,f_auto,fl_streaming_attachment/\
                        v42/articles/ep1.m4a";
const MEDIUM_URL: &str = "https://res.cloudinary.com/demo/video/upload/\
                          q_auto:good,br_32k,ar_44100,ac_2,f_auto,fl_streaming_attachment/\
                          v42/articles/ep1.m4a";
const LOW_URL: &str = "https://res.cloudinary.com/demo/video/upload/\
                       q_auto:low,br_24k,ar_22050,ac_1,f_auto,fl_streaming_attachment/\
                       v42/articles/ep1.m4a";
const FALLBACK_URL: &str =
    "https://res.cloudinary.com/demo/video/upload/f_mp3/v42/articles/ep1.m4a";

fn desktop() -> DeviceProfile {
    DeviceProfile::default()
}

fn mobile() -> DeviceProfile {
    DeviceProfile {
        is_mobile: true,
        is_android: true,
        ..Default::default()
    }
}

fn spawn_controller(
    element: &MockMediaElement,
    api: &RecordingTrackApi,
    profile: DeviceProfile,
) -> PlayerHandle {
    let (handle, controller) = PlaybackController::new(
        Box::new(element.clone()),
        &StaticCapabilities(profile),
        Arc::new(api.clone()),
        PlayerConfig::default(),
        PlayerSettings::default(),
    );
    tokio::spawn(controller.run());
    handle
}

/// Let detached fire-and-forget tasks run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn network_error() -> MediaError {
    MediaError::new(MediaErrorKind::Network, "fetch stalled")
}

#[tokio::test(start_paused = true)]
async fn load_selects_tier_transform_for_device() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();
    assert_eq!(element.load_urls(), vec![HIGH_URL.to_string()]);

    let element = MockMediaElement::new();
    let handle = spawn_controller(&element, &api, mobile());
    handle.load(TrackBuilder::new().build()).await.unwrap();
    assert_eq!(element.load_urls(), vec![MEDIUM_URL.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn track_without_media_is_terminal() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    let result = handle
        .load(TrackBuilder::new().with_media_url("").build())
        .await;
    assert!(result.is_err());

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Error);
    assert!(snap.error_message.is_some());
    assert!(element.load_urls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sentinel_duration_is_corrected_from_measurement() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(480.0).build())
        .await
        .unwrap();

    // Provisional value shown before metadata arrives
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Loading);
    assert_eq!(snap.duration_secs, 480.0);

    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(623.2),
    });
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Ready);
    assert_eq!(snap.duration_secs, 623.0);
    assert_eq!(snap.duration_source, DurationSource::Measured);

    settle().await;
    assert_eq!(api.duration_updates(), vec![("article-1".to_string(), 623)]);

    // A repeated metadata event must not send a second correction
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(623.2),
    });
    handle.snapshot().await.unwrap();
    settle().await;
    assert_eq!(api.duration_updates().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stored_duration_within_tolerance_is_kept() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(100.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(110.0),
    });

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.duration_secs, 100.0);
    assert_eq!(snap.duration_source, DurationSource::Stored);
    settle().await;
    assert!(api.duration_updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unmeasurable_duration_keeps_stored_value() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(480.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: None,
    });

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.duration_secs, 480.0);
    assert_eq!(snap.duration_source, DurationSource::Stored);
    settle().await;
    assert!(api.duration_updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn network_errors_retry_with_backoff_then_give_up() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(300.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(300.0),
    });
    handle.snapshot().await.unwrap();

    for attempt in 1..=3u32 {
        element.emit_error(network_error());
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.retry_count, attempt);
        assert_eq!(snap.state, PlayerState::Loading);
        assert!(snap.buffering);

        // Linear backoff: attempt N waits N seconds before reissuing
        tokio::time::sleep(Duration::from_millis(1000 * attempt as u64 + 50)).await;
        let urls = element.load_urls();
        assert_eq!(urls.len(), 1 + attempt as usize);
        assert_eq!(urls.last().unwrap(), RAW_MEDIA_URL);
    }

    // Budget exhausted: the next network error is terminal
    element.emit_error(network_error());
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Error);
    assert!(!snap.buffering);
    assert!(snap.error_message.unwrap().contains("3 retries"));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(element.load_urls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn playback_recovers_after_transient_stall() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(300.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(300.0),
    });
    handle.snapshot().await.unwrap();

    element.emit_error(network_error());
    handle.snapshot().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;

    // Reissued load succeeds this time
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(300.0),
    });
    handle.play().await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Playing);
    assert_eq!(snap.retry_count, 1);

    // Natural completion clears the retry budget
    element.emit(MediaEvent::Ended);
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Ended);
    assert_eq!(snap.retry_count, 0);
    assert_eq!(snap.position_secs, 300.0);
}

#[tokio::test(start_paused = true)]
async fn decode_error_reissues_original_url_once() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();
    element.emit_error(MediaError::new(MediaErrorKind::Decode, "bad frame"));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Loading);
    // The clean reissue does not consume the network retry budget
    assert_eq!(snap.retry_count, 0);
    assert_eq!(element.load_urls(), vec![HIGH_URL.to_string(), RAW_MEDIA_URL.to_string()]);

    element.emit_error(MediaError::new(MediaErrorKind::Decode, "bad frame"));
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Error);
    assert_eq!(element.load_urls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unsupported_format_forces_compatible_container_once() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();
    element.emit_error(MediaError::new(MediaErrorKind::SrcNotSupported, "no codec"));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Loading);
    assert!(snap.used_fallback);
    assert_eq!(element.load_urls(), vec![HIGH_URL.to_string(), FALLBACK_URL.to_string()]);

    // The fallback is one-shot; a second failure is terminal
    element.emit_error(MediaError::new(MediaErrorKind::SrcNotSupported, "no codec"));
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Error);
    assert_eq!(element.load_urls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn aborted_fetch_is_not_an_error() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();
    element.emit_error(MediaError::new(MediaErrorKind::Aborted, "user navigated"));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Loading);
    assert_eq!(snap.retry_count, 0);
    assert_eq!(element.load_urls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_load_watchdog_downgrades_quality() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();

    // No metadata within the watchdog window
    tokio::time::sleep(Duration::from_millis(3100)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Loading);
    assert_eq!(snap.tier, Some(QualityTier::Low));
    assert!(snap.used_fallback);
    assert_eq!(element.load_urls(), vec![HIGH_URL.to_string(), LOW_URL.to_string()]);

    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(200.0),
    });
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Ready);
}

#[tokio::test(start_paused = true)]
async fn watchdog_cancelled_once_metadata_arrives() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(200.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(200.0),
    });
    handle.snapshot().await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snap = handle.snapshot().await.unwrap();
    assert!(!snap.used_fallback);
    assert_eq!(element.load_urls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_load_cancels_pending_recovery() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();
    element.emit_error(network_error());
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.retry_count, 1);

    // A fresh load supersedes the pending retry timer
    let second_url = "https://res.cloudinary.com/demo/video/upload/v43/articles/ep2.m4a";
    handle
        .load(
            TrackBuilder::new()
                .with_id("article-2")
                .with_media_url(second_url)
                .with_duration(90.0)
                .build(),
        )
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(90.0),
    });
    handle.snapshot().await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    let urls = element.load_urls();
    assert_eq!(urls.len(), 2);
    assert!(urls[1].contains("ep2.m4a"));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.retry_count, 0);
    assert_eq!(snap.state, PlayerState::Ready);
}

#[tokio::test(start_paused = true)]
async fn seek_clamps_to_media_bounds() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(120.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(120.0),
    });
    handle.play().await.unwrap();

    assert_eq!(handle.seek(-5.0).await.unwrap(), 0.0);
    assert_eq!(handle.seek(500.0).await.unwrap(), 120.0);
    assert_eq!(handle.skip_back().await.unwrap(), 105.0);
    assert_eq!(handle.skip_forward().await.unwrap(), 120.0);
    assert_eq!(element.seeks(), vec![0.0, 120.0, 105.0, 120.0]);

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Playing);
}

#[tokio::test(start_paused = true)]
async fn blocked_autoplay_surfaces_tap_hint() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, mobile());

    handle
        .load(TrackBuilder::new().with_duration(200.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(200.0),
    });
    handle.snapshot().await.unwrap();

    element.queue_play_result(Err(PlayError::NotAllowed));
    handle.play().await.unwrap();

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Ready);
    assert!(snap.tap_to_play_hint);
    settle().await;
    assert!(api.plays().is_empty());

    // The gesture arrives; playback proceeds normally
    handle.play().await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, PlayerState::Playing);
}

#[tokio::test(start_paused = true)]
async fn each_successful_play_is_recorded() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(200.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(200.0),
    });
    handle.snapshot().await.unwrap();

    handle.play().await.unwrap();
    handle.pause().await.unwrap();
    handle.play().await.unwrap();
    settle().await;

    assert_eq!(api.plays(), vec!["article-1".to_string(), "article-1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn quality_override_reloads_and_preserves_position() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle
        .load(TrackBuilder::new().with_duration(600.0).build())
        .await
        .unwrap();
    element.emit(MediaEvent::MetadataLoaded {
        duration_secs: Some(600.0),
    });
    element.emit(MediaEvent::Progress {
        position_secs: 42.0,
        buffered_to_secs: None,
    });
    handle.snapshot().await.unwrap();

    handle.set_quality(QualityTier::Low).await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.tier, Some(QualityTier::Low));
    assert_eq!(element.load_urls(), vec![HIGH_URL.to_string(), LOW_URL.to_string()]);
    assert_eq!(element.seeks(), vec![42.0]);

    // The override is sticky: the next article starts at the chosen tier
    let second_url = "https://res.cloudinary.com/demo/video/upload/v43/articles/ep2.m4a";
    handle
        .load(
            TrackBuilder::new()
                .with_id("article-2")
                .with_media_url(second_url)
                .build(),
        )
        .await
        .unwrap();
    let urls = element.load_urls();
    assert!(urls[2].contains("q_auto:low"));
    assert!(urls[2].contains("ep2.m4a"));
}

#[tokio::test(start_paused = true)]
async fn cycle_speed_walks_the_ladder_and_wraps() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    assert_eq!(handle.cycle_speed().await.unwrap(), 1.25);
    assert_eq!(handle.cycle_speed().await.unwrap(), 1.5);
    assert_eq!(handle.cycle_speed().await.unwrap(), 1.75);
    assert_eq!(handle.cycle_speed().await.unwrap(), 2.0);
    assert_eq!(handle.cycle_speed().await.unwrap(), 0.5);

    let rates = element.rates();
    assert_eq!(rates.last(), Some(&0.5));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_loop_and_pauses() {
    let element = MockMediaElement::new();
    let api = RecordingTrackApi::new();
    let handle = spawn_controller(&element, &api, desktop());

    handle.load(TrackBuilder::new().build()).await.unwrap();
    handle.shutdown().await.unwrap();
    settle().await;

    assert!(element.pause_calls() >= 1);
    assert!(handle.snapshot().await.is_err());
}
