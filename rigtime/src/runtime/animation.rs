use crate::{ClipSource, Error, Settings, Transformation};
use std::sync::Arc;

/// Dense `[key][bone]` table of bind-pose-relative transforms.
///
/// Clips are authored (or loaded) once and then shared read-only through
/// [`AnimationInstance`]s.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    name: String,
    bone_count: usize,
    start_key: usize,
    end_key: usize,
    keys: Vec<Vec<Transformation>>,
}

impl AnimationClip {
    /// A clip of `key_count` keys where every bone sits at its bind pose.
    pub fn new(name: impl Into<String>, key_count: usize, bone_count: usize) -> Self {
        Self {
            name: name.into(),
            bone_count,
            start_key: 0,
            end_key: key_count.saturating_sub(1),
            keys: vec![vec![Transformation::IDENTITY; bone_count]; key_count],
        }
    }

    /// Builds a clip from explicit key rows; every row must have the same length.
    pub fn from_keys(
        name: impl Into<String>,
        keys: Vec<Vec<Transformation>>,
    ) -> Result<Self, Error> {
        let name = name.into();
        let bone_count = keys.first().map(Vec::len).unwrap_or(0);
        if let Some((key, row)) = keys.iter().enumerate().find(|(_, r)| r.len() != bone_count) {
            return Err(Error::InvalidClip {
                name,
                message: format!(
                    "key {key} has {} bone transforms, expected {bone_count}",
                    row.len()
                ),
            });
        }
        Ok(Self {
            name,
            bone_count,
            start_key: 0,
            end_key: keys.len().saturating_sub(1),
            keys,
        })
    }

    /// Loads the named clip from the host, sampling `bone_count` bones per key.
    pub fn from_source(
        source: &impl ClipSource,
        name: &str,
        bone_count: usize,
    ) -> Result<Self, Error> {
        let key_count = source
            .key_count(name)
            .ok_or_else(|| Error::UnknownAnimation {
                name: name.to_string(),
            })?;

        let keys = (0..key_count)
            .map(|key| {
                (0..bone_count)
                    .map(|bone| source.bone_local_transform(name, bone, key))
                    .collect()
            })
            .collect();

        log::debug!("loaded clip '{name}' ({key_count} keys, {bone_count} bones)");
        Self::from_keys(name, keys)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn set_bone_relative_transformation(
        &mut self,
        bone: usize,
        key: usize,
        transformation: Transformation,
    ) -> Result<(), Error> {
        let key_count = self.keys.len();
        let bone_count = self.bone_count;
        let row = self
            .keys
            .get_mut(key)
            .ok_or_else(|| Error::out_of_range("key", key, key_count))?;
        let slot = row
            .get_mut(bone)
            .ok_or_else(|| Error::out_of_range("bone", bone, bone_count))?;
        *slot = transformation;
        Ok(())
    }

    pub fn bone_transformation(&self, bone: usize, key: usize) -> Result<Transformation, Error> {
        let row = self
            .keys
            .get(key)
            .ok_or_else(|| Error::out_of_range("key", key, self.keys.len()))?;
        row.get(bone)
            .copied()
            .ok_or_else(|| Error::out_of_range("bone", bone, self.bone_count))
    }

    /// First key; with `exclude_zero` the key after it.
    pub fn start_key(&self, exclude_zero: bool) -> usize {
        self.start_key + usize::from(exclude_zero)
    }

    pub fn end_key(&self) -> usize {
        self.end_key
    }

    /// Key after `key`, wrapping from the end key back to the start key.
    pub fn next_key(&self, key: usize, exclude_zero: bool) -> usize {
        if key == self.end_key() {
            self.start_key(exclude_zero)
        } else {
            key + 1
        }
    }

    /// Key before `key`, wrapping from the start key back to the end key.
    pub fn previous_key(&self, key: usize, exclude_zero: bool) -> usize {
        if key == self.start_key(exclude_zero) {
            self.end_key()
        } else {
            key.saturating_sub(1)
        }
    }
}

/// Per-playback tuning of an [`AnimationInstance`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationSettings {
    /// Seconds spent on each key.
    pub frame_duration: f32,
    pub speed_coefficient: f32,
    /// Seconds spent blending from the previous animation into this one.
    pub transition_duration: f32,
    pub looping: bool,
    pub reverse: bool,
    pub interpolate_key_frames: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            frame_duration: 0.03333,
            speed_coefficient: 1.0,
            transition_duration: 0.1,
            looping: false,
            reverse: false,
            interpolate_key_frames: true,
        }
    }
}

impl AnimationSettings {
    pub const FRAME_DURATION_KEY: &'static str = "frame_duration";
    pub const SPEED_COEFFICIENT_KEY: &'static str = "speed_coefficient";
    pub const TRANSITION_DURATION_KEY: &'static str = "transition_duration";
    pub const LOOP_KEY: &'static str = "loop";
    pub const REVERSE_KEY: &'static str = "reverse";
    pub const INTERPOLATE_KEY_FRAMES_KEY: &'static str = "interpolate_key_frames";

    /// Defaults overridden by whichever keys `settings` provides.
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let mut out = Self::default();
        out.apply_settings(settings)?;
        Ok(out)
    }

    /// Overrides fields present in `settings`. On error `self` is left untouched.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), Error> {
        let mut updated = *self;
        if let Some(v) = settings.get_f32(Self::FRAME_DURATION_KEY)? {
            updated.frame_duration = v;
        }
        if let Some(v) = settings.get_f32(Self::SPEED_COEFFICIENT_KEY)? {
            updated.speed_coefficient = v;
        }
        if let Some(v) = settings.get_f32(Self::TRANSITION_DURATION_KEY)? {
            updated.transition_duration = v;
        }
        if let Some(v) = settings.get_bool(Self::LOOP_KEY)? {
            updated.looping = v;
        }
        if let Some(v) = settings.get_bool(Self::REVERSE_KEY)? {
            updated.reverse = v;
        }
        if let Some(v) = settings.get_bool(Self::INTERPOLATE_KEY_FRAMES_KEY)? {
            updated.interpolate_key_frames = v;
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.frame_duration.is_finite() && self.frame_duration > 0.0) {
            return Err(Error::InvalidValue {
                message: format!("frame duration must be finite and > 0, got {}", self.frame_duration),
            });
        }
        if !(self.speed_coefficient.is_finite() && self.speed_coefficient >= 0.0) {
            return Err(Error::InvalidValue {
                message: format!(
                    "speed coefficient must be finite and >= 0, got {}",
                    self.speed_coefficient
                ),
            });
        }
        if !(self.transition_duration.is_finite() && self.transition_duration >= 0.0) {
            return Err(Error::InvalidValue {
                message: format!(
                    "transition duration must be finite and >= 0, got {}",
                    self.transition_duration
                ),
            });
        }
        Ok(())
    }
}

/// A clip bound to a set of playback settings.
///
/// The clip is fixed for the lifetime of the instance; the settings stay tweakable.
#[derive(Clone, Debug)]
pub struct AnimationInstance {
    clip: Arc<AnimationClip>,
    pub settings: AnimationSettings,
}

impl AnimationInstance {
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            settings: AnimationSettings::default(),
        }
    }

    pub fn with_settings(clip: Arc<AnimationClip>, settings: AnimationSettings) -> Self {
        Self { clip, settings }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn shared_clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn name(&self) -> &str {
        self.clip.name()
    }
}
