use crate::{
    AnimationInstance, Error, Skeleton, SkinningPose, SkinningSink, Timeline, TimelineEffector,
    Transformation,
};

/// Plays [`AnimationInstance`]s on a [`Skeleton`] through a [`Timeline`].
///
/// The animator caches the clip transforms of the two keys bracketing the current position
/// ("current key" and "next key", one entry per bone index) and refreshes them whenever the
/// timeline reports a frame change. Each update blends the brackets, poses the skeleton
/// relative to its bind pose, and exports the skinning matrices.
pub struct Animator {
    timeline: Timeline,
    current_animation: Option<AnimationInstance>,

    current_key_frame_transformations: Vec<Transformation>,
    next_key_frame_transformations: Vec<Transformation>,

    global_speed_coefficient: f32,

    skinning_pose: SkinningPose,
    skinning_sink: Option<Box<dyn SkinningSink>>,
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("timeline", &self.timeline)
            .field(
                "current_animation",
                &self.current_animation.as_ref().map(AnimationInstance::name),
            )
            .field("global_speed_coefficient", &self.global_speed_coefficient)
            .field("skinned_bones", &self.skinning_pose.bone_count())
            .field("has_skinning_sink", &self.skinning_sink.is_some())
            .finish()
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    pub fn new() -> Self {
        Self::with_timeline(Timeline::new())
    }

    pub fn with_timeline(timeline: Timeline) -> Self {
        Self {
            timeline,
            current_animation: None,
            current_key_frame_transformations: Vec::new(),
            next_key_frame_transformations: Vec::new(),
            global_speed_coefficient: 1.0,
            skinning_pose: SkinningPose::default(),
            skinning_sink: None,
        }
    }

    pub fn has_animation(&self) -> bool {
        self.current_animation.is_some()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Frame changes caused through this handle are picked up on the next update.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn current_animation(&self) -> Option<&AnimationInstance> {
        self.current_animation.as_ref()
    }

    pub fn current_animation_mut(&mut self) -> Option<&mut AnimationInstance> {
        self.current_animation.as_mut()
    }

    pub fn global_speed_coefficient(&self) -> f32 {
        self.global_speed_coefficient
    }

    pub fn set_global_speed_coefficient(&mut self, coefficient: f32) -> Result<(), Error> {
        if !(coefficient.is_finite() && coefficient >= 0.0) {
            return Err(Error::InvalidValue {
                message: format!("global speed coefficient must be finite and >= 0, got {coefficient}"),
            });
        }
        self.global_speed_coefficient = coefficient;
        Ok(())
    }

    pub fn set_skinning_sink<S: SkinningSink + 'static>(&mut self, sink: S) {
        self.skinning_sink = Some(Box::new(sink));
    }

    pub fn clear_skinning_sink(&mut self) {
        self.skinning_sink = None;
    }

    /// The skinning data exported by the last update or stop.
    pub fn skinning_pose(&self) -> &SkinningPose {
        &self.skinning_pose
    }

    pub fn current_key_frame_transformations(&self) -> &[Transformation] {
        &self.current_key_frame_transformations
    }

    pub fn next_key_frame_transformations(&self) -> &[Transformation] {
        &self.next_key_frame_transformations
    }

    /// Plays `animation` from its first key.
    ///
    /// If another animation is bound and transitions are not ignored, the pose currently
    /// shown (including any in-flight blend) becomes the start of a transition towards the
    /// new animation's first key.
    pub fn play_animation(&mut self, animation: &AnimationInstance) -> Result<(), Error> {
        if animation.clip().is_empty() {
            return Err(Error::InvalidClip {
                name: animation.name().to_string(),
                message: "clip has no keys".to_string(),
            });
        }
        animation.settings.validate()?;

        let willing_for_transition = self.has_animation()
            && !self.timeline.effector(TimelineEffector::IgnoreTransitioning);
        let previous_alpha = self.interpolation_alpha();

        self.current_animation = Some(animation.clone());
        self.timeline.sync_to_animation(animation);
        self.timeline.reset();

        if willing_for_transition {
            self.calculate_transition_start_and_end_point(previous_alpha)?;
            self.timeline
                .play_transition(animation.settings.transition_duration);
        } else {
            self.update_frame_transformations()?;
            self.timeline.play();
        }
        self.timeline.take_frame_changes();

        log::debug!(
            "playing animation '{}' ({})",
            animation.name(),
            if willing_for_transition {
                "with transition"
            } else {
                "direct"
            }
        );
        Ok(())
    }

    /// Unbinds the animation, pauses the timeline and returns the skeleton to its bind pose.
    pub fn stop_animation(&mut self, skeleton: &mut Skeleton) {
        self.current_key_frame_transformations.clear();
        self.next_key_frame_transformations.clear();
        self.current_animation = None;
        self.timeline.pause();
        self.apply_bind_pose(skeleton);
        self.send_skinning_matrices(skeleton);
        log::debug!("animation stopped");
    }

    pub fn update(&mut self, delta: f32, skeleton: &mut Skeleton) -> Result<(), Error> {
        let Some(speed_coefficient) = self
            .current_animation
            .as_ref()
            .map(|animation| animation.settings.speed_coefficient)
        else {
            return Ok(());
        };

        self.timeline
            .update(delta * self.global_speed_coefficient * speed_coefficient);
        if self.timeline.take_frame_changes() > 0 {
            self.update_frame_transformations()?;
        }

        self.apply_animation_to_skeleton(skeleton)?;
        self.send_skinning_matrices(skeleton);
        Ok(())
    }

    /// Pauses and steps one key forward or backward, ignoring the playing direction.
    pub fn step_key_frame(&mut self, forward: bool) -> Result<(), Error> {
        if !self.has_animation() {
            return Ok(());
        }
        self.timeline.pause();
        if forward {
            self.timeline.go_to_next_key_frame(true);
        } else {
            self.timeline.go_to_previous_key_frame(true);
        }
        self.timeline.take_frame_changes();
        self.update_frame_transformations()
    }

    /// Interpolation alpha applied to the brackets, honouring the animation's
    /// `interpolate_key_frames` setting while playing.
    pub fn interpolation_alpha(&self) -> f32 {
        let snap_to_key = self.timeline.is_playing()
            && self
                .current_animation
                .as_ref()
                .is_some_and(|animation| !animation.settings.interpolate_key_frames);
        if snap_to_key {
            0.0
        } else {
            self.timeline.interpolation_alpha()
        }
    }

    /// Re-reads the current and next key of the bound clip into the bracket cache.
    pub fn update_frame_transformations(&mut self) -> Result<(), Error> {
        let Some(animation) = self.current_animation.as_ref() else {
            return Ok(());
        };
        let clip = animation.clip();
        let current_key = self.timeline.current_key_frame();
        let next_key = self.timeline.next_key_frame(false);

        let current = (0..clip.bone_count())
            .map(|bone| clip.bone_transformation(bone, current_key))
            .collect::<Result<Vec<_>, _>>()?;
        let next = (0..clip.bone_count())
            .map(|bone| clip.bone_transformation(bone, next_key))
            .collect::<Result<Vec<_>, _>>()?;

        self.current_key_frame_transformations = current;
        self.next_key_frame_transformations = next;
        Ok(())
    }

    /// Uses the pose blended at `previous_alpha` from the outgoing brackets as transition
    /// start, and the first key of the bound clip as transition end.
    pub fn calculate_transition_start_and_end_point(
        &mut self,
        previous_alpha: f32,
    ) -> Result<(), Error> {
        let Some(animation) = self.current_animation.as_ref() else {
            return Ok(());
        };
        let clip = animation.clip();
        let first_key = self.timeline.first_key_frame(false);

        let mut start = Vec::with_capacity(clip.bone_count());
        let mut end = Vec::with_capacity(clip.bone_count());
        for bone in 0..clip.bone_count() {
            let from = match (
                self.current_key_frame_transformations.get(bone),
                self.next_key_frame_transformations.get(bone),
            ) {
                (Some(current), Some(next)) => current.interpolate(next, previous_alpha),
                _ => Transformation::IDENTITY,
            };
            start.push(from);
            end.push(clip.bone_transformation(bone, first_key)?);
        }

        self.current_key_frame_transformations = start;
        self.next_key_frame_transformations = end;
        Ok(())
    }

    /// Blend of the cached brackets for one bone.
    pub fn interpolate(&self, bone: usize, alpha: f32) -> Result<Transformation, Error> {
        let len = self.current_key_frame_transformations.len();
        let start = self
            .current_key_frame_transformations
            .get(bone)
            .ok_or_else(|| Error::out_of_range("bone", bone, len))?;
        let end = self
            .next_key_frame_transformations
            .get(bone)
            .ok_or_else(|| Error::out_of_range("bone", bone, len))?;
        Ok(start.interpolate(end, alpha))
    }

    pub fn apply_animation_to_skeleton(&self, skeleton: &mut Skeleton) -> Result<(), Error> {
        let alpha = self.interpolation_alpha();
        let offsets = skeleton
            .bones()
            .iter()
            .map(|bone| self.interpolate(bone.index(), alpha))
            .collect::<Result<Vec<_>, _>>()?;
        skeleton.set_relative_pose(&offsets)
    }

    pub fn apply_bind_pose(&self, skeleton: &mut Skeleton) {
        skeleton.reset_to_bind_pose();
    }

    /// Rebuilds the skinning export and forwards it to the installed sink, if any.
    pub fn send_skinning_matrices(&mut self, skeleton: &Skeleton) {
        self.skinning_pose.rebuild(skeleton);
        if let Some(sink) = self.skinning_sink.as_mut() {
            sink.set_skinning_pose(
                self.skinning_pose.as_row_major(),
                self.skinning_pose.bone_count(),
            );
        }
    }
}
