use crate::{AnimationInstance, AnimationSettings, Error, Settings};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TimelineState {
    #[default]
    Paused,
    Playing,
    Transitioning,
}

/// Latched modifiers altering how a [`Timeline`] advances and interpolates.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TimelineEffector {
    /// Inverts the playing direction of the synced animation.
    Rewind,
    /// Never loop, even if the synced animation asks for it.
    IgnoreLooping,
    /// Start new animations directly, without blending from the previous pose.
    IgnoreTransitioning,
    /// Snap to the bracket start key (interpolation alpha is always 0).
    IgnoreFrameInterpolation,
}

impl TimelineEffector {
    pub const ALL: [Self; 4] = [
        Self::Rewind,
        Self::IgnoreLooping,
        Self::IgnoreTransitioning,
        Self::IgnoreFrameInterpolation,
    ];

    fn index(self) -> usize {
        match self {
            Self::Rewind => 0,
            Self::IgnoreLooping => 1,
            Self::IgnoreTransitioning => 2,
            Self::IgnoreFrameInterpolation => 3,
        }
    }

    pub fn setting_key(self) -> &'static str {
        match self {
            Self::Rewind => "rewind_effector",
            Self::IgnoreLooping => "ignore_looping_effector",
            Self::IgnoreTransitioning => "ignore_transitioning_effector",
            Self::IgnoreFrameInterpolation => "ignore_frame_interpolation_effector",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Effectors {
    states: [bool; 4],
}

impl Effectors {
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let mut out = Self::default();
        for effector in TimelineEffector::ALL {
            if let Some(state) = settings.get_bool(effector.setting_key())? {
                out.set(effector, state);
            }
        }
        Ok(out)
    }

    pub fn get(&self, effector: TimelineEffector) -> bool {
        self.states[effector.index()]
    }

    pub fn set(&mut self, effector: TimelineEffector, state: bool) {
        self.states[effector.index()] = state;
    }

    pub fn toggle(&mut self, effector: TimelineEffector) {
        self.set(effector, !self.get(effector));
    }
}

/// Frame-advance state machine over the key range of the synced animation.
///
/// Every key change is counted as a frame-changed notification; the owner drains them with
/// [`Timeline::take_frame_changes`] to know when its cached key data is stale.
#[derive(Clone, Debug)]
pub struct Timeline {
    current_key_frame: usize,
    start_key_frame: usize,
    end_key_frame: usize,

    frame_timer: f32,
    frame_duration: f32,

    transition_timer: f32,
    transition_duration: f32,

    looping: bool,
    reverse: bool,

    pause_previous_state: TimelineState,
    current_state: TimelineState,

    effectors: Effectors,
    pending_frame_changes: u32,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::with_effectors(Effectors::default())
    }

    pub fn with_effectors(effectors: Effectors) -> Self {
        Self {
            current_key_frame: 0,
            start_key_frame: 0,
            end_key_frame: 0,
            frame_timer: 0.0,
            frame_duration: AnimationSettings::default().frame_duration,
            transition_timer: 0.0,
            transition_duration: 0.0,
            looping: false,
            reverse: false,
            pause_previous_state: TimelineState::Paused,
            current_state: TimelineState::Paused,
            effectors,
            pending_frame_changes: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        Ok(Self::with_effectors(Effectors::from_settings(settings)?))
    }

    pub fn state(&self) -> TimelineState {
        self.current_state
    }

    pub fn is_playing(&self) -> bool {
        self.current_state == TimelineState::Playing
    }

    pub fn is_transitioning(&self) -> bool {
        self.current_state == TimelineState::Transitioning
    }

    pub fn is_paused(&self) -> bool {
        self.current_state == TimelineState::Paused
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse != self.effectors.get(TimelineEffector::Rewind)
    }

    pub fn is_looping(&self) -> bool {
        self.looping && !self.effectors.get(TimelineEffector::IgnoreLooping)
    }

    pub fn is_last_key_frame(&self, ignore_direction: bool) -> bool {
        self.current_key_frame == self.last_key_frame(ignore_direction)
    }

    pub fn is_first_key_frame(&self, ignore_direction: bool) -> bool {
        self.current_key_frame == self.first_key_frame(ignore_direction)
    }

    pub fn effectors(&self) -> Effectors {
        self.effectors
    }

    pub fn effector(&self, effector: TimelineEffector) -> bool {
        self.effectors.get(effector)
    }

    pub fn set_effector(&mut self, effector: TimelineEffector, state: bool) {
        self.effectors.set(effector, state);
    }

    pub fn toggle_effector(&mut self, effector: TimelineEffector) {
        self.effectors.toggle(effector);
    }

    pub fn current_key_frame(&self) -> usize {
        self.current_key_frame
    }

    pub fn next_key_frame(&self, ignore_direction: bool) -> usize {
        if !ignore_direction && self.is_reversed() {
            return self.previous_key_frame(true);
        }
        if self.current_key_frame == self.end_key_frame {
            self.start_key_frame
        } else {
            self.current_key_frame + 1
        }
    }

    pub fn previous_key_frame(&self, ignore_direction: bool) -> usize {
        if !ignore_direction && self.is_reversed() {
            return self.next_key_frame(true);
        }
        if self.current_key_frame == self.start_key_frame {
            self.end_key_frame
        } else {
            self.current_key_frame - 1
        }
    }

    pub fn first_key_frame(&self, ignore_direction: bool) -> usize {
        if ignore_direction || !self.is_reversed() {
            self.start_key_frame
        } else {
            self.end_key_frame
        }
    }

    pub fn last_key_frame(&self, ignore_direction: bool) -> usize {
        if ignore_direction || !self.is_reversed() {
            self.end_key_frame
        } else {
            self.start_key_frame
        }
    }

    pub fn go_to_next_key_frame(&mut self, ignore_direction: bool) {
        self.current_key_frame = self.next_key_frame(ignore_direction);
        self.emit_frame_changed();
    }

    pub fn go_to_previous_key_frame(&mut self, ignore_direction: bool) {
        self.current_key_frame = self.previous_key_frame(ignore_direction);
        self.emit_frame_changed();
    }

    pub fn frame_timer(&self) -> f32 {
        self.frame_timer
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    pub fn transition_timer(&self) -> f32 {
        self.transition_timer
    }

    pub fn transition_duration(&self) -> f32 {
        self.transition_duration
    }

    /// Frame changes emitted since the last call.
    pub fn take_frame_changes(&mut self) -> u32 {
        std::mem::take(&mut self.pending_frame_changes)
    }

    /// Copies key range, frame duration and direction flags. The state is left untouched.
    pub fn sync_to_animation(&mut self, animation: &AnimationInstance) {
        let clip = animation.clip();
        self.start_key_frame = clip.start_key(false);
        self.end_key_frame = clip.end_key();
        self.frame_duration = animation.settings.frame_duration;
        self.looping = animation.settings.looping;
        self.reverse = animation.settings.reverse;
        self.current_key_frame = self
            .current_key_frame
            .clamp(self.start_key_frame, self.end_key_frame);
    }

    pub fn reset(&mut self) {
        self.current_key_frame = self.start_key_frame;
        self.frame_timer = 0.0;
        self.transition_timer = 0.0;
    }

    pub fn play(&mut self) {
        self.current_state = TimelineState::Playing;
    }

    /// Enters the transitioning state for `duration` seconds, unless
    /// [`TimelineEffector::IgnoreTransitioning`] is set.
    pub fn play_transition(&mut self, duration: f32) {
        if self.effectors.get(TimelineEffector::IgnoreTransitioning) {
            return;
        }
        self.current_key_frame = self.first_key_frame(false);
        self.transition_timer = 0.0;
        self.transition_duration = duration;
        self.current_state = TimelineState::Transitioning;
        log::debug!("timeline transition started ({duration}s)");
    }

    pub fn pause(&mut self) {
        if self.current_state != TimelineState::Paused {
            self.pause_previous_state = self.current_state;
        }
        self.current_state = TimelineState::Paused;
    }

    pub fn resume(&mut self) {
        self.current_state = self.pause_previous_state;
        self.pause_previous_state = TimelineState::Paused;
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Blend factor between the bracket keys for the current state, in `[0, 1)`.
    pub fn interpolation_alpha(&self) -> f32 {
        if self.effectors.get(TimelineEffector::IgnoreFrameInterpolation) {
            return 0.0;
        }
        match self.current_state {
            TimelineState::Playing if self.frame_duration > 0.0 => {
                self.frame_timer / self.frame_duration
            }
            TimelineState::Transitioning if self.transition_duration > 0.0 => {
                self.transition_timer / self.transition_duration
            }
            _ => 0.0,
        }
    }

    /// Advances the timers by `delta` seconds and returns the number of frame changes emitted.
    pub fn update(&mut self, delta: f32) -> u32 {
        if !delta.is_finite() || delta < 0.0 {
            log::warn!("ignoring timeline update with delta {delta}");
            return 0;
        }
        let before = self.pending_frame_changes;
        match self.current_state {
            TimelineState::Playing => self.update_playing_state(delta),
            TimelineState::Transitioning => self.update_transitioning_state(delta),
            TimelineState::Paused => {}
        }
        self.pending_frame_changes.saturating_sub(before)
    }

    fn update_playing_state(&mut self, delta: f32) {
        if self.frame_duration.is_nan() || self.frame_duration <= 0.0 {
            log::warn!(
                "timeline cannot advance with frame duration {}",
                self.frame_duration
            );
            return;
        }

        self.frame_timer += delta;

        while self.frame_timer >= self.frame_duration {
            self.frame_timer -= self.frame_duration;
            self.go_to_next_key_frame(false);

            if self.is_last_key_frame(false) && !self.is_looping() {
                self.frame_timer = 0.0;
                self.pause();
                break;
            }
        }
    }

    fn update_transitioning_state(&mut self, delta: f32) {
        self.transition_timer += delta;

        if self.transition_timer >= self.transition_duration {
            self.play();
            self.emit_frame_changed();
            log::debug!("timeline transition finished at key {}", self.current_key_frame);
        }
    }

    fn emit_frame_changed(&mut self) {
        self.pending_frame_changes = self.pending_frame_changes.saturating_add(1);
        log::trace!("timeline frame changed to key {}", self.current_key_frame);
    }
}
