//! Frame animation and data-refresh state machine.
//!
//! The engine performs no I/O. Each [`AnimationEngine::tick`] returns a
//! [`TickOutcome`] describing the fetch to issue, the frame to draw, the
//! notices to surface and how long to wait before the next tick; the runner
//! carries those out. Fetch results come back through
//! [`AnimationEngine::on_fetch_success`] / [`AnimationEngine::on_fetch_error`].

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};
use viewer_common::{ProductResponse, QueryParameters, ViewerError};

use crate::config::ViewerConfig;
use crate::form::{FormController, FormEvent};
use crate::playback::{PlaybackMode, PlaybackState};

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    /// First load or periodic realtime refresh
    Refresh,
    /// The user changed a form control
    FormChange,
    /// Archive query came back empty; parameters were reset to realtime
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub params: QueryParameters,
    pub reason: FetchReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    pub index: usize,
    pub url: String,
}

/// The non-frame parts of the last product description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductView {
    pub title: String,
    pub target: String,
    pub prod_html: String,
    pub status_html: String,
    pub zoom: String,
}

/// Side effects requested by one tick.
#[derive(Debug)]
pub struct TickOutcome {
    pub fetch: Option<FetchRequest>,
    pub render: Option<RenderFrame>,
    pub notices: Vec<ViewerError>,
    /// Delay before the next tick
    pub wait: Duration,
}

impl TickOutcome {
    fn new(wait: Duration) -> Self {
        Self {
            fetch: None,
            render: None,
            notices: Vec::new(),
            wait,
        }
    }
}

/// What the empty-result check decided.
enum EmptyResultStep {
    /// Frames available, carry on with the tick
    Proceed,
    /// Archive fallback applied; the rest of the tick runs on fresh state
    ResetAndProceed,
    /// Realtime feed is empty; nothing to do until it is fixed
    Halt,
}

/// Owns playback state and query parameters; the only writer of both.
#[derive(Debug)]
pub struct AnimationEngine {
    form: FormController,
    defaults: QueryParameters,
    params: QueryParameters,
    playback: PlaybackState,
    frames: Vec<String>,
    product: Option<ProductView>,
    last_refresh: Option<Instant>,
    refresh_interval: Duration,
    advance_wait: Duration,
    dwell_wait: Duration,
}

impl AnimationEngine {
    pub fn new(config: &ViewerConfig) -> Self {
        let defaults = config.defaults.clone();
        Self {
            form: FormController::new(config.volumetric_fields.iter().cloned(), defaults.clone()),
            params: defaults.clone(),
            defaults,
            playback: PlaybackState::initial(config.advance_wait()),
            frames: Vec::new(),
            product: None,
            last_refresh: None,
            refresh_interval: config.refresh_interval(),
            advance_wait: config.advance_wait(),
            dwell_wait: config.dwell_wait(),
        }
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn product(&self) -> Option<&ProductView> {
        self.product.as_ref()
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Takes effect on the next tick.
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        debug!(mode = %mode, "Playback mode set");
        self.playback.mode = mode;
    }

    /// Apply a form change; returns the fetch it requires, if any.
    ///
    /// The form fetch counts as the latest refresh, so the next tick does
    /// not issue a second fetch for the same parameters.
    pub fn apply_form_event(&mut self, event: FormEvent, now: Instant) -> Option<FetchRequest> {
        if self.form.apply(&mut self.params, event) {
            info!(query = %self.params.to_query_string(), "Query parameters changed");
            self.last_refresh = Some(now);
            Some(self.fetch_request(FetchReason::FormChange))
        } else {
            None
        }
    }

    /// Replace the frame list and jump to the newest frame, forcing a redraw.
    pub fn on_fetch_success(&mut self, response: ProductResponse) -> &ProductView {
        let count = response.frame_count();
        info!(frames = count, title = %response.title, "Product refreshed");

        self.frames = response.frames;
        self.playback.frame_count = count;
        self.playback.current_frame = count as isize - 1;
        self.playback.last_rendered_frame = -1;

        self.product.insert(ProductView {
            title: response.title,
            target: response.target,
            prod_html: response.prod_html,
            status_html: response.status_html,
            zoom: response.zoom,
        })
    }

    /// A failed fetch leaves playback untouched; the error is passed back
    /// for display.
    pub fn on_fetch_error(&mut self, error: ViewerError) -> ViewerError {
        warn!(error = %error, "Product fetch failed, keeping previous frames");
        error
    }

    /// Run one scheduling step.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::new(self.playback.wait);

        match self.check_empty_result(now, &mut outcome) {
            EmptyResultStep::Halt => return outcome,
            EmptyResultStep::ResetAndProceed | EmptyResultStep::Proceed => {}
        }

        if outcome.fetch.is_none() && self.refresh_due(now) {
            debug!("Realtime refresh due");
            outcome.fetch = Some(self.fetch_request(FetchReason::Refresh));
            self.last_refresh = Some(now);
        }

        self.dispatch_mode();
        outcome.render = self.render();
        outcome.wait = self.playback.wait;
        outcome
    }

    fn check_empty_result(&mut self, now: Instant, outcome: &mut TickOutcome) -> EmptyResultStep {
        if self.playback.frame_count > 0 {
            return EmptyResultStep::Proceed;
        }

        if self.params.end_time.is_realtime() {
            let notice = ViewerError::EmptyResultRealtime {
                field: self.params.field.clone(),
            };
            warn!(error = %notice, "Realtime product has no frames");
            outcome.notices.push(notice);
            return EmptyResultStep::Halt;
        }

        let notice = ViewerError::EmptyResultArchive {
            field: self.params.field.clone(),
            end_time: self.params.end_time.to_string(),
        };
        warn!(error = %notice, "Archive query empty, falling back to realtime");
        outcome.notices.push(notice);

        self.params = self.defaults.clone();
        self.playback = PlaybackState::initial(self.advance_wait);
        self.frames.clear();
        outcome.fetch = Some(self.fetch_request(FetchReason::Fallback));
        self.last_refresh = Some(now);

        EmptyResultStep::ResetAndProceed
    }

    fn refresh_due(&self, now: Instant) -> bool {
        if !self.params.end_time.is_realtime() && self.last_refresh.is_some() {
            return false;
        }
        match self.last_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.refresh_interval,
        }
    }

    fn dispatch_mode(&mut self) {
        let count = self.playback.frame_count as isize;
        let state = &mut self.playback;

        match state.mode {
            PlaybackMode::Play => {
                let next = state.current_frame + 1;
                state.current_frame = if next >= count { 0 } else { next };
                state.wait = if state.is_on_last_frame() {
                    self.dwell_wait
                } else {
                    self.advance_wait
                };
                return;
            }
            PlaybackMode::First => state.current_frame = 0,
            PlaybackMode::Last => state.current_frame = count - 1,
            PlaybackMode::Prev => state.current_frame = (state.current_frame - 1).max(0),
            PlaybackMode::Next => state.current_frame = (state.current_frame + 1).min(count - 1),
            PlaybackMode::Stop => {}
        }

        if state.mode.is_one_shot() {
            debug!(mode = %state.mode, frame = state.current_frame, "One-shot control applied");
            state.mode = PlaybackMode::Stop;
        }
        state.wait = self.advance_wait;
    }

    fn render(&mut self) -> Option<RenderFrame> {
        let current = self.playback.current_frame;
        if current == self.playback.last_rendered_frame {
            return None;
        }
        let index = usize::try_from(current).ok()?;
        let url = self.frames.get(index)?.clone();
        self.playback.last_rendered_frame = current;
        Some(RenderFrame { index, url })
    }

    fn fetch_request(&self, reason: FetchReason) -> FetchRequest {
        FetchRequest {
            params: self.params.clone(),
            reason,
        }
    }
}
