use crate::camera::capability::{
    CameraCapture, CameraErrorKind, CapturePoll, Detection, LandmarkSource, SourceOptions,
    SourcePoll,
};
use crate::camera::platform::PlatformProfile;
use crate::foundation::core::TimestampMs;
use crate::foundation::error::{FramefitError, FramefitResult};

/// Failed acquisition attempts tolerated before the machine parks at
/// [`CameraPhase::Failed`].
pub const MAX_RETRIES: u32 = 3;

/// Pause between a retryable failure and the next attempt.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Lifecycle phase of the camera and detector pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPhase {
    /// Nothing requested yet, or torn down.
    Idle,
    /// Waiting for the platform to resolve a stream request.
    Requesting,
    /// Stream up; waiting for the detector to accept it.
    InitializingDetector,
    /// Producing frames.
    Ready,
    /// A retryable failure; another attempt is scheduled.
    Error(CameraErrorKind),
    /// Retries exhausted or the failure was terminal. `Display` of the kind
    /// is the user-actionable message.
    Failed(CameraErrorKind),
}

/// What an automatic start decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartDisposition {
    /// Acquisition began.
    Started,
    /// The platform gates camera start behind a user gesture; the session
    /// stays idle until [`CameraSession::start`] is called from one.
    AwaitingGesture,
}

/// Poll-driven camera and detector lifecycle.
///
/// `Idle -> Requesting -> InitializingDetector -> Ready`, with bounded
/// timeouts on the two waiting phases and serialized, capped retries on
/// retryable failures. The machine never reads a clock; every entry point
/// takes the caller's `now`. Teardown is unconditional on drop.
#[derive(Debug)]
pub struct CameraSession<C: CameraCapture, S: LandmarkSource> {
    capture: C,
    source: S,
    profile: PlatformProfile,
    options: SourceOptions,
    phase: CameraPhase,
    // Failed attempts so far; the MAX_RETRIES'th failure parks at Failed.
    retry_count: u32,
    deadline: Option<TimestampMs>,
    retry_at: Option<TimestampMs>,
}

impl<C: CameraCapture, S: LandmarkSource> CameraSession<C, S> {
    /// Build a session over the two capabilities.
    pub fn new(
        capture: C,
        source: S,
        profile: PlatformProfile,
        options: SourceOptions,
    ) -> FramefitResult<Self> {
        options.validate()?;
        Ok(Self {
            capture,
            source,
            profile,
            options,
            phase: CameraPhase::Idle,
            retry_count: 0,
            deadline: None,
            retry_at: None,
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    /// Failed acquisition attempts so far.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// The profile this session acquires under.
    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Begin acquisition from an explicit user action.
    ///
    /// Also the retry affordance: callable again from `Failed`. Ignored
    /// while an attempt is already in flight or the session is ready.
    pub fn start(&mut self, now: TimestampMs) {
        match self.phase {
            CameraPhase::Idle | CameraPhase::Failed(_) => {
                self.retry_count = 0;
                self.begin_request(now);
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "start ignored, session already active");
            }
        }
    }

    /// Begin acquisition automatically where the platform allows it.
    pub fn start_auto(&mut self, now: TimestampMs) -> StartDisposition {
        if self.profile.gesture_gated_start {
            tracing::info!("camera start deferred, platform requires a user gesture");
            return StartDisposition::AwaitingGesture;
        }
        self.start(now);
        StartDisposition::Started
    }

    /// Advance timeouts and scheduled retries. Call at frame rate.
    pub fn tick(&mut self, now: TimestampMs) {
        match self.phase {
            CameraPhase::Idle | CameraPhase::Ready | CameraPhase::Failed(_) => {}
            CameraPhase::Error(_) => {
                if self.retry_at.is_some_and(|at| now >= at) {
                    self.begin_request(now);
                }
            }
            CameraPhase::Requesting => match self.capture.poll(now) {
                CapturePoll::Pending => {
                    // An unresolved request behaves like a busy device.
                    if self.deadline.is_some_and(|d| now >= d) {
                        self.fail_or_retry(CameraErrorKind::DeviceBusy, now);
                    }
                }
                CapturePoll::Ready => match self.source.configure(&self.options) {
                    Ok(()) => {
                        self.phase = CameraPhase::InitializingDetector;
                        self.deadline =
                            Some(now.saturating_add(self.profile.detector_timeout_ms));
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "detector rejected configuration");
                        self.fail_or_retry(CameraErrorKind::DetectorUnavailable, now);
                    }
                },
                CapturePoll::Failed(kind) => self.fail_or_retry(kind, now),
            },
            CameraPhase::InitializingDetector => match self.source.poll_ready(now) {
                SourcePoll::Pending => {
                    if self.deadline.is_some_and(|d| now >= d) {
                        self.fail_or_retry(CameraErrorKind::DetectorTimeout, now);
                    }
                }
                SourcePoll::Ready => {
                    tracing::info!(retries = self.retry_count, "camera session ready");
                    self.phase = CameraPhase::Ready;
                    self.deadline = None;
                    self.retry_count = 0;
                }
                SourcePoll::Unavailable => {
                    self.fail_or_retry(CameraErrorKind::DetectorUnavailable, now);
                }
            },
        }
    }

    /// Pull one frame through the detector.
    ///
    /// `Ok(None)` means no frame was available this tick; that is ordinary
    /// at startup and between capture callbacks.
    pub fn pump(&mut self, now: TimestampMs) -> FramefitResult<Option<Detection>> {
        if self.phase != CameraPhase::Ready {
            return Err(FramefitError::session(format!(
                "pump requires Ready, session is {:?}",
                self.phase
            )));
        }
        match self.capture.next_frame(now) {
            None => Ok(None),
            Some(frame) => self.source.process(frame, now).map(Some),
        }
    }

    /// Tear everything down and return to `Idle`. Idempotent.
    pub fn stop(&mut self) {
        self.capture.stop();
        self.source.close();
        self.phase = CameraPhase::Idle;
        self.retry_count = 0;
        self.deadline = None;
        self.retry_at = None;
    }

    fn begin_request(&mut self, now: TimestampMs) {
        self.capture.request(&self.profile.constraints);
        self.phase = CameraPhase::Requesting;
        self.deadline = Some(now.saturating_add(self.profile.stream_timeout_ms));
        self.retry_at = None;
    }

    fn fail_or_retry(&mut self, kind: CameraErrorKind, now: TimestampMs) {
        // Release both devices between attempts; a half-open request must
        // not survive into the next one.
        self.capture.stop();
        self.source.close();
        self.deadline = None;
        self.retry_count += 1;

        if kind.retryable() && self.retry_count < MAX_RETRIES {
            tracing::warn!(
                kind = %kind,
                attempt = self.retry_count,
                "camera attempt failed, retry scheduled"
            );
            self.phase = CameraPhase::Error(kind);
            self.retry_at = Some(now.saturating_add(RETRY_DELAY_MS));
        } else {
            tracing::error!(kind = %kind, attempts = self.retry_count, "camera acquisition failed");
            self.phase = CameraPhase::Failed(kind);
            self.retry_at = None;
        }
    }
}

impl<C: CameraCapture, S: LandmarkSource> Drop for CameraSession<C, S> {
    fn drop(&mut self) {
        self.capture.stop();
        self.source.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/session.rs"]
mod tests;
