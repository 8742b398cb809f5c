//! Session state coordinator
//!
//! One session owns the location, the ambient context fetched for it, the mood
//! selection and the latest recommendation. State lives in a
//! [`tokio::sync::watch`] channel so observers always see a consistent
//! snapshot, and user-facing notices go out on a broadcast channel.
//!
//! At most one recommendation request is in flight per session. A reset while
//! a request is pending releases the session and discards that answer when it
//! lands. Dropping a `submit` or `load_context` future part way never leaves
//! the session stuck in a busy phase.

pub mod mood;

pub use mood::MoodSelection;

use crate::air::AirQualitySample;
use crate::coord::GeoCoordinate;
use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::prompt::{build_prompt, PromptInput};
use crate::recommend::Recommendation;
use crate::weather::WeatherSnapshot;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Capacity of the notice channel; slow listeners lose the oldest notices
const NOTICE_CAPACITY: usize = 16;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing loaded yet
    Idle,
    /// Ambient context is being fetched
    Loading,
    /// Context loaded; moods can be picked and submitted
    Ready,
    /// A recommendation request is in flight
    Submitting,
}

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Some context sources failed; prompts will use placeholders for them
    PartialContext { missing: Vec<String> },
    /// Submit was pressed with no mood selected
    SelectMood,
    /// The recommendation request failed
    RecommendationFailed { reason: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PartialContext { missing } => {
                write!(f, "Could not load {}; continuing without it", missing.join(", "))
            }
            Self::SelectMood => write!(f, "Please select your mood first"),
            Self::RecommendationFailed { reason } => {
                write!(f, "Could not get a recommendation: {}", reason)
            }
        }
    }
}

/// Address, weather and air quality around the session location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientContext {
    pub address: String,
    pub weather: Option<WeatherSnapshot>,
    pub air_quality: Option<AirQualitySample>,
}

impl AmbientContext {
    /// Names of the sources that produced nothing
    pub fn missing_sources(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.weather.is_none() {
            missing.push("weather".to_string());
        }
        if self.air_quality.is_none() {
            missing.push("air quality".to_string());
        }
        missing
    }
}

/// Snapshot of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub coordinate: Option<GeoCoordinate>,
    pub context: Option<AmbientContext>,
    pub moods: MoodSelection,
    pub result: Option<Recommendation>,
    /// Bumped on reset so a late answer can tell it is stale
    #[serde(skip)]
    generation: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            coordinate: None,
            context: None,
            moods: MoodSelection::new(),
            result: None,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }
}

/// What a submission needs, captured when it is admitted
struct Admitted {
    context: AmbientContext,
    moods: MoodSelection,
    generation: u64,
}

/// Releases a busy phase when the future that set it is dropped early
///
/// A submission guard only fires while its generation is current, so it
/// never clobbers a newer submission admitted after a reset.
struct BusyGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    phase: Phase,
    generation: Option<u64>,
}

impl<'a> BusyGuard<'a> {
    fn loading(state: &'a watch::Sender<SessionState>) -> Self {
        Self {
            state,
            phase: Phase::Loading,
            generation: None,
        }
    }

    fn submitting(state: &'a watch::Sender<SessionState>, generation: u64) -> Self {
        Self {
            state,
            phase: Phase::Submitting,
            generation: Some(generation),
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            let current = self.generation.map_or(true, |g| g == s.generation);
            if s.phase != self.phase || !current {
                return false;
            }
            s.phase = if s.context.is_some() {
                Phase::Ready
            } else {
                Phase::Idle
            };
            true
        });
    }
}

/// Coordinates context loading, mood selection and recommendation requests
pub struct Session<G> {
    id: Uuid,
    gateway: G,
    state: watch::Sender<SessionState>,
    notices: broadcast::Sender<Notice>,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G) -> Self {
        let (state, _) = watch::channel(SessionState::new());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            gateway,
            state,
            notices,
            clock: local_now,
        }
    }

    /// Use `clock` for the time-of-day phrase instead of the local wall clock
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fetch address, weather and air quality for a location concurrently
    ///
    /// Individual source failures do not fail the load; they surface as a
    /// [`Notice::PartialContext`] and placeholders in later prompts.
    pub async fn load_context(&self, latitude: f64, longitude: f64) -> Result<AmbientContext> {
        let coord = GeoCoordinate::checked(latitude, longitude)?;

        let mut rejected = None;
        self.state.send_if_modified(|s| match s.phase {
            Phase::Loading => {
                rejected = Some(Error::InvalidInput(
                    "context is already being loaded".to_string(),
                ));
                false
            }
            Phase::Submitting => {
                rejected = Some(Error::SubmissionInFlight);
                false
            }
            Phase::Idle | Phase::Ready => {
                s.phase = Phase::Loading;
                s.coordinate = Some(coord);
                true
            }
        });
        if let Some(err) = rejected {
            return Err(err);
        }
        let _busy = BusyGuard::loading(&self.state);

        info!(session = %self.id, %coord, "loading ambient context");
        let (weather, air_quality, address) = tokio::join!(
            self.gateway.fetch_weather(coord),
            self.gateway.fetch_air_quality(coord),
            self.gateway.fetch_address(coord),
        );

        let context = AmbientContext {
            address,
            weather,
            air_quality,
        };

        let missing = context.missing_sources();
        if !missing.is_empty() {
            warn!(session = %self.id, ?missing, "ambient context incomplete");
            self.notify(Notice::PartialContext { missing });
        }

        self.state.send_modify(|s| {
            s.context = Some(context.clone());
            s.phase = Phase::Ready;
        });
        debug!(session = %self.id, address = %context.address, "ambient context ready");

        Ok(context)
    }

    /// Toggle a mood tag; returns whether it is selected afterwards
    pub fn toggle_mood(&self, tag: &str) -> bool {
        let mut selected = false;
        self.state.send_if_modified(|s| {
            let before = s.moods.len();
            selected = s.moods.toggle(tag);
            s.moods.len() != before
        });
        selected
    }

    /// Ask for a recommendation for the current moods and context
    ///
    /// `is_retry` asks the backend for something other than its last answer.
    /// Returns `Ok(None)` when the request failed (a notice is sent) or when
    /// the session was reset while it was in flight.
    pub async fn submit(&self, is_retry: bool) -> Result<Option<Recommendation>> {
        let admitted = self.admit()?;
        let _busy = BusyGuard::submitting(&self.state, admitted.generation);

        let prompt = build_prompt(&PromptInput {
            address: &admitted.context.address,
            weather: admitted.context.weather.as_ref(),
            air_quality: admitted.context.air_quality.as_ref(),
            moods: &admitted.moods,
            is_retry,
            now: (self.clock)(),
        });
        info!(
            session = %self.id,
            is_retry,
            moods = %admitted.moods.join(","),
            "requesting recommendation"
        );

        let result = match self.gateway.request_recommendation(&prompt).await {
            Ok(recommendation) => Some(recommendation),
            Err(e) => {
                warn!(session = %self.id, error = %e, "recommendation failed");
                self.notify(Notice::RecommendationFailed {
                    reason: e.to_string(),
                });
                None
            }
        };

        let mut stale = false;
        self.state.send_if_modified(|s| {
            if s.generation != admitted.generation {
                // A reset already released the phase; it may belong to a newer submission
                stale = true;
                return false;
            }
            s.phase = Phase::Ready;
            s.result = result.clone();
            true
        });

        if stale {
            debug!(session = %self.id, "session reset during request; answer dropped");
            return Ok(None);
        }
        Ok(result)
    }

    /// Check the submission guards and move to `Submitting` in one step
    fn admit(&self) -> Result<Admitted> {
        let mut outcome = Err(Error::ContextNotLoaded);
        self.state.send_if_modified(|s| {
            if s.moods.is_empty() {
                outcome = Err(Error::InvalidInput("no mood selected".to_string()));
                return false;
            }
            match (s.phase, &s.context) {
                (Phase::Submitting, _) => {
                    outcome = Err(Error::SubmissionInFlight);
                    false
                }
                (Phase::Ready, Some(context)) => {
                    outcome = Ok(Admitted {
                        context: context.clone(),
                        moods: s.moods.clone(),
                        generation: s.generation,
                    });
                    s.phase = Phase::Submitting;
                    s.result = None;
                    true
                }
                _ => false,
            }
        });

        if matches!(outcome, Err(Error::InvalidInput(_))) {
            self.notify(Notice::SelectMood);
        }
        outcome
    }

    /// Clear moods and the result; the loaded context is kept
    ///
    /// A pending submission is released: the session returns to `Ready` at
    /// once and that submission's answer is dropped when it lands.
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            s.moods.clear();
            s.result = None;
            s.generation += 1;
            if s.phase == Phase::Submitting {
                s.phase = Phase::Ready;
            }
        });
        debug!(session = %self.id, "session reset");
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.borrow().is_submitting()
    }

    pub fn result(&self) -> Option<Recommendation> {
        self.state.borrow().result.clone()
    }

    pub fn moods(&self) -> MoodSelection {
        self.state.borrow().moods.clone()
    }

    pub fn context(&self) -> Option<AmbientContext> {
        self.state.borrow().context.clone()
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Listen for notices sent from now on
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn notify(&self, notice: Notice) {
        // No listeners is fine
        let _ = self.notices.send(notice);
    }
}
