use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::{PlayerConfig, PlayerSettings};
use crate::constants::{RETRY_BACKOFF_UNIT, SLOW_LOAD_WATCHDOG, SPEED_LADDER};
use crate::models::{QualityTier, Track, TrackId};
use crate::player::capabilities::CapabilityProvider;
use crate::player::capabilities::DeviceProfile;
use crate::player::duration::{self, DurationSource};
use crate::player::error::{MediaError, MediaErrorKind, PlayError, PlaybackError};
use crate::player::preload;
use crate::player::session::PlaybackSession;
use crate::player::traits::{MediaElement, MediaEvent, PlayerState};
use crate::player::transform;
use crate::services::telemetry::TrackApi;

/// Commands that can be sent to the playback controller
#[derive(Debug)]
pub enum PlayerCommand {
    /// Load a track, replacing any live session
    Load {
        track: Track,
        respond_to: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Start playback
    Play {
        respond_to: oneshot::Sender<Result<(), PlaybackError>>,
    },
    /// Pause playback
    Pause { respond_to: oneshot::Sender<()> },
    /// Seek to an absolute position; responds with the clamped position
    Seek {
        position_secs: f64,
        respond_to: oneshot::Sender<f64>,
    },
    /// Seek relative to the current position
    Skip {
        delta_secs: f64,
        respond_to: oneshot::Sender<f64>,
    },
    /// Advance the playback rate through the fixed ladder
    CycleSpeed { respond_to: oneshot::Sender<f64> },
    /// Set volume (0.0 to 1.0), persisted across sessions
    SetVolume {
        volume: f64,
        respond_to: oneshot::Sender<()>,
    },
    /// Explicit user quality override, sticky across loads
    SetQuality {
        tier: QualityTier,
        respond_to: oneshot::Sender<()>,
    },
    /// Get an observable snapshot of the current session
    Snapshot {
        respond_to: oneshot::Sender<PlaybackSnapshot>,
    },
    /// Release the media resource and stop the event loop
    Shutdown { respond_to: oneshot::Sender<()> },
}

/// Timer firings routed back into the event loop. Each carries the session
/// generation it was armed for; stale generations are dropped.
#[derive(Debug)]
enum TimerEvent {
    SlowLoadWatchdog { generation: u64 },
    RetryBackoff { generation: u64, url: String },
}

/// Observable state for a UI layer.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub state: PlayerState,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub duration_source: DurationSource,
    pub buffering: bool,
    pub tier: Option<QualityTier>,
    pub retry_count: u32,
    pub used_fallback: bool,
    pub error_message: Option<String>,
    pub tap_to_play_hint: bool,
}

/// Controller that owns the media element and processes commands and media
/// events on one cooperative loop.
pub struct PlaybackController {
    element: Box<dyn MediaElement>,
    media_events: mpsc::UnboundedReceiver<MediaEvent>,
    commands: mpsc::UnboundedReceiver<PlayerCommand>,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    track_api: Arc<dyn TrackApi>,

    profile: DeviceProfile,
    config: PlayerConfig,
    settings: PlayerSettings,

    session: Option<PlaybackSession>,
    tier_override: Option<QualityTier>,
    generation: u64,

    watchdog: Option<CancellationToken>,
    retry_timer: Option<CancellationToken>,

    tap_to_play_hint: bool,
    hint_shown_once: bool,
}

impl PlaybackController {
    /// Create a controller and the handle used to drive it. The capability
    /// probe runs once here; the profile is immutable for the controller's
    /// lifetime.
    pub fn new(
        mut element: Box<dyn MediaElement>,
        capabilities: &dyn CapabilityProvider,
        track_api: Arc<dyn TrackApi>,
        config: PlayerConfig,
        settings: PlayerSettings,
    ) -> (PlayerHandle, PlaybackController) {
        let profile = capabilities.probe();
        info!(
            "Device profile: mobile={} ios={} slow={} -> default tier {}",
            profile.is_mobile,
            profile.is_ios,
            profile.is_slow_connection,
            profile.default_tier()
        );

        let media_events = element.subscribe();
        let (sender, commands) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let controller = PlaybackController {
            element,
            media_events,
            commands,
            timer_tx,
            timer_rx,
            track_api,
            profile,
            config,
            settings,
            session: None,
            tier_override: None,
            generation: 0,
            watchdog: None,
            retry_timer: None,
            tap_to_play_hint: false,
            hint_shown_once: false,
        };

        (PlayerHandle { sender }, controller)
    }

    /// Run the controller event loop.
    pub async fn run(mut self) {
        debug!("PlaybackController event loop started");

        // Restore persisted user preferences onto the element
        self.element.set_volume(self.settings.volume).await;
        self.element.set_rate(self.settings.playback_rate).await;

        loop {
            tokio::select! {
                biased;
                Some(event) = self.media_events.recv() => {
                    self.handle_media_event(event).await;
                }
                Some(timer) = self.timer_rx.recv() => {
                    self.handle_timer(timer).await;
                }
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        self.cancel_timers();
        self.element.pause().await;
        debug!("PlaybackController event loop terminated");
    }

    /// Returns true when the loop should stop.
    async fn handle_command(&mut self, command: PlayerCommand) -> bool {
        match command {
            PlayerCommand::Load { track, respond_to } => {
                trace!("Loading track: {}", track.title);
                let result = self.load_track(track).await;
                let _ = respond_to.send(result);
            }
            PlayerCommand::Play { respond_to } => {
                trace!("Starting playback");
                let result = self.start_playback().await;
                let _ = respond_to.send(result);
            }
            PlayerCommand::Pause { respond_to } => {
                trace!("Pausing playback");
                self.pause_playback().await;
                let _ = respond_to.send(());
            }
            PlayerCommand::Seek {
                position_secs,
                respond_to,
            } => {
                trace!("Seeking to {position_secs}s");
                let clamped = self.seek_to(position_secs).await;
                let _ = respond_to.send(clamped);
            }
            PlayerCommand::Skip {
                delta_secs,
                respond_to,
            } => {
                trace!("Skipping {delta_secs}s");
                let current = self
                    .session
                    .as_ref()
                    .map(|s| s.position_secs)
                    .unwrap_or(0.0);
                let clamped = self.seek_to(current + delta_secs).await;
                let _ = respond_to.send(clamped);
            }
            PlayerCommand::CycleSpeed { respond_to } => {
                let rate = self.cycle_speed().await;
                let _ = respond_to.send(rate);
            }
            PlayerCommand::SetVolume { volume, respond_to } => {
                self.set_volume(volume).await;
                let _ = respond_to.send(());
            }
            PlayerCommand::SetQuality { tier, respond_to } => {
                self.set_quality(tier).await;
                let _ = respond_to.send(());
            }
            PlayerCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
            PlayerCommand::Shutdown { respond_to } => {
                info!("Shutting down playback controller");
                let _ = respond_to.send(());
                return true;
            }
        }
        false
    }

    // === Load path ===

    async fn load_track(&mut self, track: Track) -> Result<(), PlaybackError> {
        self.cancel_timers();
        self.generation += 1;
        self.tap_to_play_hint = false;

        if !track.has_media() {
            warn!("Track {} has no media reference", track.id);
            let mut session =
                PlaybackSession::new(track, self.active_tier(), self.generation);
            session.state = PlayerState::Error;
            session.buffering = false;
            session.error_message = Some("This article has no audio".to_string());
            self.session = Some(session);
            return Err(PlaybackError::InvalidInput);
        }

        // Tear down listeners bound to the old resource before the new
        // session attaches; events from the superseded load go stale here.
        self.swap_resource();

        let tier = self.active_tier();
        let mut session = PlaybackSession::new(track, tier, self.generation);
        let url = transform::select_transform(
            &session.track.media_url,
            tier,
            &self.config.quality,
        );
        debug!("Selected media URL: {url}");
        session.current_url = url.clone();
        self.session = Some(session);

        if let Err(e) = self
            .element
            .load(&url, self.profile.preload_strategy())
            .await
        {
            warn!("Initial media load failed: {e:#}");
            self.handle_media_error(MediaError::new(MediaErrorKind::Network, e.to_string()))
                .await;
            return Ok(());
        }

        self.arm_watchdog();
        Ok(())
    }

    fn swap_resource(&mut self) {
        self.media_events = self.element.subscribe();
    }

    fn active_tier(&self) -> QualityTier {
        self.tier_override.unwrap_or(self.profile.default_tier())
    }

    fn preload_buffer_secs(&self) -> f64 {
        self.config
            .playback
            .preload_buffer_secs
            .min(self.profile.preload_buffer_secs())
    }

    // === Playback commands ===

    async fn start_playback(&mut self) -> Result<(), PlaybackError> {
        let Some(session) = self.session.as_mut() else {
            return Err(PlaybackError::InvalidInput);
        };
        if !matches!(session.state, PlayerState::Ready | PlayerState::Paused) {
            trace!("Ignoring play request in state {:?}", session.state);
            return Ok(());
        }

        match self.element.play().await {
            Ok(()) => {
                if let Some(session) = self.session.as_mut() {
                    session.state = PlayerState::Playing;
                    session.error_message = None;
                }
                self.spawn_play_telemetry();
                Ok(())
            }
            Err(PlayError::NotAllowed) => {
                if self.profile.requires_user_gesture() && !self.hint_shown_once {
                    self.hint_shown_once = true;
                    self.tap_to_play_hint = true;
                    info!("Autoplay blocked, surfacing tap-to-play hint");
                }
                // A blocked gesture is a hint, not a failure
                Ok(())
            }
            Err(PlayError::Failed(msg)) => {
                warn!("Play request failed: {msg}");
                Ok(())
            }
        }
    }

    async fn pause_playback(&mut self) {
        // An explicit pause before the watchdog fires invalidates it
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel();
        }
        self.element.pause().await;
        if let Some(session) = self.session.as_mut() {
            session.buffering = false;
            if matches!(session.state, PlayerState::Playing | PlayerState::Ready) {
                session.state = PlayerState::Paused;
            }
        }
    }

    async fn seek_to(&mut self, position_secs: f64) -> f64 {
        let Some(session) = self.session.as_mut() else {
            return 0.0;
        };
        let clamped = session.clamp_seek(position_secs);
        session.position_secs = clamped;
        let was_playing = session.state == PlayerState::Playing;

        self.element.seek(clamped).await;
        if was_playing {
            match self.element.play().await {
                Ok(()) => {}
                Err(PlayError::NotAllowed) => {
                    trace!("Autoplay after seek prevented");
                }
                Err(PlayError::Failed(msg)) => warn!("Play after seek failed: {msg}"),
            }
        }
        clamped
    }

    async fn cycle_speed(&mut self) -> f64 {
        let current = SPEED_LADDER
            .iter()
            .position(|r| (r - self.settings.playback_rate).abs() < f64::EPSILON)
            .unwrap_or(2); // 1.0x
        let next = SPEED_LADDER[(current + 1) % SPEED_LADDER.len()];

        self.settings.playback_rate = next;
        self.element.set_rate(next).await;
        if let Err(e) = self.settings.save() {
            warn!("Failed to persist playback rate: {e:#}");
        }
        next
    }

    async fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        self.settings.volume = volume;
        self.element.set_volume(volume).await;
        if let Err(e) = self.settings.save() {
            warn!("Failed to persist volume: {e:#}");
        }
    }

    async fn set_quality(&mut self, tier: QualityTier) {
        info!("Quality override: {tier}");
        self.tier_override = Some(tier);

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let url =
            transform::select_transform(&session.track.media_url, tier, &self.config.quality);
        session.tier = tier;
        if url == session.current_url {
            return;
        }

        // Live re-load at the new tier, preserving position and play state
        let position = session.position_secs;
        let was_playing = session.state == PlayerState::Playing;
        session.current_url = url.clone();

        if let Err(e) = self
            .element
            .load(&url, self.profile.preload_strategy())
            .await
        {
            warn!("Quality change load failed: {e:#}");
            return;
        }
        self.element.seek(position).await;
        if was_playing {
            if let Err(e) = self.element.play().await {
                trace!("Resume after quality change prevented: {e}");
            }
        }
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        match &self.session {
            Some(session) => PlaybackSnapshot {
                state: session.state,
                position_secs: session.position_secs,
                duration_secs: session.resolved_duration_secs(),
                duration_source: session.duration_source,
                buffering: session.buffering,
                tier: Some(session.tier),
                retry_count: session.retry_count,
                used_fallback: session.used_fallback,
                error_message: session.error_message.clone(),
                tap_to_play_hint: self.tap_to_play_hint,
            },
            None => PlaybackSnapshot {
                state: PlayerState::Idle,
                position_secs: 0.0,
                duration_secs: 0.0,
                duration_source: DurationSource::Stored,
                buffering: false,
                tier: None,
                retry_count: 0,
                used_fallback: false,
                error_message: None,
                tap_to_play_hint: self.tap_to_play_hint,
            },
        }
    }

    // === Media events ===

    async fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded { duration_secs } => {
                self.handle_metadata(duration_secs).await;
            }
            MediaEvent::Progress {
                position_secs,
                buffered_to_secs,
            } => {
                self.handle_progress(position_secs, buffered_to_secs);
            }
            MediaEvent::Waiting => {
                if let Some(session) = self.session.as_mut() {
                    trace!("Buffering underrun");
                    session.buffering = true;
                }
            }
            MediaEvent::Resumed => {
                if let Some(session) = self.session.as_mut() {
                    session.buffering = false;
                }
            }
            MediaEvent::Paused => {
                if let Some(session) = self.session.as_mut() {
                    if session.state == PlayerState::Playing {
                        session.state = PlayerState::Paused;
                    }
                    session.buffering = false;
                }
            }
            MediaEvent::Ended => {
                if let Some(session) = self.session.as_mut() {
                    debug!("Track ended: {}", session.track.title);
                    session.state = PlayerState::Ended;
                    session.position_secs = session.resolved_duration_secs();
                    session.buffering = false;
                    session.retry_count = 0;
                }
            }
            MediaEvent::Error(error) => {
                self.handle_media_error(error).await;
            }
        }
    }

    async fn handle_metadata(&mut self, measured_secs: Option<f64>) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel();
        }
        let preload_hint = self.profile.preload_strategy();
        let buffer_secs = self.preload_buffer_secs();

        let Some(session) = self.session.as_mut() else {
            return;
        };

        let resolved = duration::reconcile(measured_secs, session.track.duration_secs);
        debug!(
            "Duration reconciled: stored={:?} measured={:?} -> {}s ({:?})",
            session.track.duration_secs, measured_secs, resolved.seconds, resolved.source
        );
        session.set_resolved_duration(resolved.seconds, resolved.source);

        if resolved.needs_update && !session.duration_update_sent {
            session.duration_update_sent = true;
            let id = session.track.id.clone();
            let seconds = resolved.seconds as u32;
            self.spawn_duration_update(id, seconds);
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.buffering = false;
        if session.state == PlayerState::Loading {
            session.state = PlayerState::Ready;
        }

        // Initial preload hint for the head of the track
        if preload_hint != crate::player::capabilities::PreloadStrategy::None {
            let duration = session.resolved_duration_secs();
            let end = if duration > 0.0 {
                buffer_secs.min(duration)
            } else {
                buffer_secs
            };
            if session.preloaded.record(0.0, end) {
                trace!("Marked initial preload range [0, {end})");
            }
        }
    }

    fn handle_progress(&mut self, position_secs: f64, buffered_to_secs: Option<f64>) {
        let profile = self.profile.clone();
        let buffer_secs = self.preload_buffer_secs();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.position_secs = position_secs;

        if session.state != PlayerState::Playing {
            return;
        }
        let Some(buffered_to) = buffered_to_secs else {
            return;
        };

        if let Some((start, end)) = preload::plan_preload(
            &profile,
            position_secs,
            buffered_to,
            session.resolved_duration_secs(),
            buffer_secs,
            &session.preloaded,
        ) {
            session.preloaded.record(start, end);
            debug!("Marked preload range [{start}, {end})");
        }
    }

    // === Error classification and recovery ===

    /// Single classification step: every element-level failure lands here
    /// and maps onto exactly one recovery action.
    async fn handle_media_error(&mut self, error: MediaError) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel();
        }

        let Some(session) = self.session.as_ref() else {
            return;
        };
        let generation = session.generation;

        match error.kind {
            MediaErrorKind::Aborted => {
                debug!("Media fetch aborted: {}", error.message);
            }
            MediaErrorKind::Network => {
                self.retry_with_backoff(generation, error.message).await;
            }
            MediaErrorKind::Decode => {
                self.retry_clean_decode(error.message).await;
            }
            MediaErrorKind::SrcNotSupported => {
                self.use_format_fallback(error.message).await;
            }
        }
    }

    async fn retry_with_backoff(&mut self, generation: u64, message: String) {
        let max_retries = self.config.playback.max_retries;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.retry_count >= max_retries {
            warn!("Network error after {max_retries} retries: {message}");
            session.state = PlayerState::Error;
            session.buffering = false;
            session.error_message =
                Some(PlaybackError::MaxRetriesExceeded(max_retries).to_string());
            if let Some(timer) = self.retry_timer.take() {
                timer.cancel();
            }
            return;
        }

        session.retry_count += 1;
        session.state = PlayerState::Loading;
        session.buffering = true;

        let delay = RETRY_BACKOFF_UNIT * session.retry_count;
        let clean_url = transform::strip_transform(&session.track.media_url);
        session.current_url = clean_url.clone();
        info!(
            "Network error ({message}); retry {}/{} with clean URL in {:?}",
            session.retry_count, max_retries, delay
        );

        if let Some(previous) = self.retry_timer.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.retry_timer = Some(token.clone());
        let timer_tx = self.timer_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = timer_tx.send(TimerEvent::RetryBackoff {
                        generation,
                        url: clean_url,
                    });
                }
            }
        });
    }

    async fn retry_clean_decode(&mut self, message: String) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.decode_retry_used {
            warn!("Decode failed again on the clean URL: {message}");
            session.state = PlayerState::Error;
            session.buffering = false;
            session.error_message =
                Some(PlaybackError::DecodeFailure(message).to_string());
            return;
        }

        // One un-counted reissue with the original untransformed URL
        session.decode_retry_used = true;
        session.state = PlayerState::Loading;
        session.buffering = true;
        let url = transform::strip_transform(&session.track.media_url);
        session.current_url = url.clone();
        info!("Decode error ({message}); reissuing original URL");

        if let Err(e) = self
            .element
            .load(&url, self.profile.preload_strategy())
            .await
        {
            warn!("Decode-fallback load failed: {e:#}");
        }
    }

    async fn use_format_fallback(&mut self, message: String) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.used_fallback {
            warn!("Format still unsupported after fallback: {message}");
            session.state = PlayerState::Error;
            session.buffering = false;
            session.error_message =
                Some(PlaybackError::UnsupportedFormat(message).to_string());
            return;
        }

        session.used_fallback = true;
        session.state = PlayerState::Loading;
        session.buffering = true;
        let url = transform::forced_fallback(&session.track.media_url, &self.config.quality);
        session.current_url = url.clone();
        info!("Unsupported format ({message}); forcing compatible container");

        if let Err(e) = self
            .element
            .load(&url, self.profile.preload_strategy())
            .await
        {
            warn!("Format-fallback load failed: {e:#}");
        }
    }

    // === Timers ===

    fn arm_watchdog(&mut self) {
        if let Some(previous) = self.watchdog.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.watchdog = Some(token.clone());
        let timer_tx = self.timer_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(SLOW_LOAD_WATCHDOG) => {
                    let _ = timer_tx.send(TimerEvent::SlowLoadWatchdog { generation });
                }
            }
        });
    }

    async fn handle_timer(&mut self, timer: TimerEvent) {
        match timer {
            TimerEvent::SlowLoadWatchdog { generation } => {
                if !self.generation_is_live(generation) {
                    trace!("Dropping stale watchdog for generation {generation}");
                    return;
                }
                self.watchdog = None;
                self.apply_slow_load_downgrade().await;
            }
            TimerEvent::RetryBackoff { generation, url } => {
                if !self.generation_is_live(generation) {
                    trace!("Dropping stale retry for generation {generation}");
                    return;
                }
                self.retry_timer = None;
                info!("Retrying load with {url}");
                if let Err(e) = self
                    .element
                    .load(&url, self.profile.preload_strategy())
                    .await
                {
                    warn!("Retry load failed: {e:#}");
                    self.handle_media_error(MediaError::new(
                        MediaErrorKind::Network,
                        e.to_string(),
                    ))
                    .await;
                }
            }
        }
    }

    fn generation_is_live(&self, generation: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.generation == generation)
    }

    /// Slow-connection downgrade: still no metadata after the watchdog
    /// window, so drop to the low tier. Shares the one-shot fallback gate
    /// with the unsupported-format path.
    async fn apply_slow_load_downgrade(&mut self) {
        let session = match self.session.as_mut() {
            Some(s) if s.state == PlayerState::Loading && !s.used_fallback => s,
            _ => return,
        };

        session.used_fallback = true;
        let url = transform::select_transform(
            &session.track.media_url,
            QualityTier::Low,
            &self.config.quality,
        );
        info!("Slow load detected, downgrading to low quality");
        session.tier = QualityTier::Low;
        session.current_url = url.clone();

        if let Err(e) = self
            .element
            .load(&url, self.profile.preload_strategy())
            .await
        {
            warn!("Low-quality downgrade load failed: {e:#}");
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel();
        }
        if let Some(timer) = self.retry_timer.take() {
            timer.cancel();
        }
    }

    // === Fire-and-forget telemetry ===

    fn spawn_duration_update(&self, id: TrackId, seconds: u32) {
        let api = Arc::clone(&self.track_api);
        tokio::spawn(async move {
            if let Err(e) = api.update_duration(&id, seconds).await {
                warn!("Failed to persist corrected duration for {id}: {e:#}");
            }
        });
    }

    fn spawn_play_telemetry(&self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let id = session.track.id.clone();
        let api = Arc::clone(&self.track_api);
        tokio::spawn(async move {
            if let Err(e) = api.record_play(&id).await {
                warn!("Failed to record play for {id}: {e:#}");
            }
        });
    }
}

/// Handle to send commands to the playback controller
#[derive(Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("sender", &"<UnboundedSender>")
            .finish()
    }
}

impl PlayerHandle {
    /// Load a track, replacing any live session
    pub async fn load(&self, track: Track) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Load { track, respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))?
            .map_err(anyhow::Error::from)
    }

    /// Start playback
    pub async fn play(&self) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Play { respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))?
            .map_err(anyhow::Error::from)
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Pause { respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Seek to an absolute position; returns the clamped position
    pub async fn seek(&self, position_secs: f64) -> Result<f64> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Seek {
                position_secs,
                respond_to,
            })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Seek relative to the current position; returns the clamped position
    pub async fn skip(&self, delta_secs: f64) -> Result<f64> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Skip {
                delta_secs,
                respond_to,
            })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Jump back by the standard skip interval
    pub async fn skip_back(&self) -> Result<f64> {
        self.skip(-crate::constants::SKIP_BACK_SECS).await
    }

    /// Jump forward by the standard skip interval
    pub async fn skip_forward(&self) -> Result<f64> {
        self.skip(crate::constants::SKIP_FORWARD_SECS).await
    }

    /// Advance the playback rate through the fixed ladder; returns the new rate
    pub async fn cycle_speed(&self) -> Result<f64> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::CycleSpeed { respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Set volume (0.0 to 1.0)
    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::SetVolume { volume, respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Override the quality tier; sticky across subsequent loads
    pub async fn set_quality(&self, tier: QualityTier) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::SetQuality { tier, respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Get an observable snapshot of the current session
    pub async fn snapshot(&self) -> Result<PlaybackSnapshot> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Snapshot { respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }

    /// Stop the controller and release the media resource
    pub async fn shutdown(&self) -> Result<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PlayerCommand::Shutdown { respond_to })
            .map_err(|_| anyhow::anyhow!("Playback controller disconnected"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive response from playback controller"))
    }
}
