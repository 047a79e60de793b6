use glam::{EulerRot, Quat, Vec3};
use rigtime::{
    AnimationClip, AnimationInstance, AnimationSettings, Animator, BoneData, Skeleton,
    SkeletonData, SkeletonStyle, SkinningSink, TimelineEffector, TimelineStyle, Transformation,
    build_skeleton_lines, build_timeline_lines,
};
use std::sync::Arc;

const STEP: f32 = 1.0 / 60.0;

struct CountingSink {
    uploads: usize,
    floats: usize,
}

impl SkinningSink for CountingSink {
    fn set_skinning_pose(&mut self, matrices: &[f32], _bone_count: usize) {
        self.uploads += 1;
        self.floats = matrices.len();
        log::trace!("skinning upload #{} ({} floats)", self.uploads, self.floats);
    }
}

fn bone(name: &str, parent: Option<usize>, position: Vec3) -> BoneData {
    BoneData {
        name: name.to_string(),
        parent,
        bind: Transformation::from_position(position),
    }
}

fn degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        x.to_radians(),
        y.to_radians(),
        z.to_radians(),
    )
}

fn rig() -> SkeletonData {
    SkeletonData {
        bones: vec![
            bone("pelvis", None, Vec3::new(0.0, 0.0, 90.0)),
            bone("spine", Some(0), Vec3::new(0.0, 0.0, 20.0)),
            bone("neck", Some(1), Vec3::new(0.0, 0.0, 30.0)),
            bone("arm_l", Some(1), Vec3::new(-15.0, 0.0, 25.0)),
            bone("arm_r", Some(1), Vec3::new(15.0, 0.0, 25.0)),
            bone("leg_l", Some(0), Vec3::new(-10.0, 0.0, -45.0)),
            bone("leg_r", Some(0), Vec3::new(10.0, 0.0, -45.0)),
            bone("leg_l_ik", Some(0), Vec3::new(-10.0, 0.0, -90.0)),
            bone("leg_r_ik", Some(0), Vec3::new(10.0, 0.0, -90.0)),
        ],
    }
}

fn dab(data: &SkeletonData) -> AnimationClip {
    let mut clip = AnimationClip::new("dab", 3, data.bones.len());
    let poses = [
        ("neck", 1, degrees(30.0, 0.0, -20.0)),
        ("neck", 2, degrees(45.0, 0.0, -35.0)),
        ("arm_l", 1, degrees(0.0, -60.0, 10.0)),
        ("arm_l", 2, degrees(0.0, -110.0, 20.0)),
        ("arm_r", 1, degrees(0.0, 45.0, -30.0)),
        ("arm_r", 2, degrees(0.0, 70.0, -45.0)),
    ];
    for (name, key, rotation) in poses {
        let index = data.bone_index(name).expect("dab bone");
        clip.set_bone_relative_transformation(index, key, Transformation::from_rotation(rotation))
            .expect("dab key");
    }
    clip
}

fn squat(data: &SkeletonData) -> AnimationClip {
    let mut clip = AnimationClip::new("squat", 4, data.bones.len());
    let pelvis = data.bone_index("pelvis").expect("pelvis");
    for (key, depth) in [0.0, -15.0, -30.0, -15.0].into_iter().enumerate() {
        let offset = Transformation::new(Vec3::new(0.0, 0.0, depth), degrees(depth * 0.5, 0.0, 0.0));
        clip.set_bone_relative_transformation(pelvis, key, offset)
            .expect("squat key");
    }
    clip
}

fn run(animator: &mut Animator, skeleton: &mut Skeleton, seconds: f32) {
    let steps = (seconds / STEP).round() as usize;
    for _ in 0..steps {
        animator.update(STEP, skeleton).expect("update");
    }
    let timeline = animator.timeline();
    log::info!(
        "{:>6} key {}/{} state {:?} alpha {:.2} skinned bones {}",
        animator.current_animation().map_or("-", |a| a.name()),
        timeline.current_key_frame() + 1,
        timeline.last_key_frame(true) + 1,
        timeline.state(),
        animator.interpolation_alpha(),
        animator.skinning_pose().bone_count(),
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data = rig();
    let mut skeleton = Skeleton::from_bind_pose(&data).expect("skeleton");

    let dab = AnimationInstance::with_settings(
        Arc::new(dab(&data)),
        AnimationSettings {
            frame_duration: 0.25,
            transition_duration: 0.3,
            ..AnimationSettings::default()
        },
    );
    let squat = AnimationInstance::with_settings(
        Arc::new(squat(&data)),
        AnimationSettings {
            frame_duration: 0.2,
            looping: true,
            ..AnimationSettings::default()
        },
    );

    let mut animator = Animator::new();
    animator.set_skinning_sink(CountingSink {
        uploads: 0,
        floats: 0,
    });

    animator.play_animation(&squat).expect("play squat");
    run(&mut animator, &mut skeleton, 1.0);

    animator.play_animation(&dab).expect("play dab");
    run(&mut animator, &mut skeleton, 0.15);
    run(&mut animator, &mut skeleton, 0.6);

    animator.timeline_mut().toggle_pause();
    run(&mut animator, &mut skeleton, 0.5);
    animator.step_key_frame(false).expect("step");
    run(&mut animator, &mut skeleton, 0.0);

    animator
        .timeline_mut()
        .toggle_effector(TimelineEffector::Rewind);
    animator.play_animation(&squat).expect("play squat reversed");
    run(&mut animator, &mut skeleton, 1.0);

    let skeleton_lines = build_skeleton_lines(&skeleton, Vec3::ZERO, &SkeletonStyle::default());
    let timeline_lines =
        build_timeline_lines(animator.timeline(), Vec3::new(0.0, 0.0, 200.0), &TimelineStyle::default());
    log::info!(
        "debug lines: skeleton {} timeline {}",
        skeleton_lines.len(),
        timeline_lines.len()
    );

    let mut bytes = Vec::new();
    animator
        .skinning_pose()
        .write_le(&mut bytes)
        .expect("write skinning");
    log::info!("skinning buffer {} bytes", bytes.len());

    animator.stop_animation(&mut skeleton);
    log::info!(
        "stopped; pelvis back at {:?}",
        skeleton.transform(0).expect("pelvis").world_position()
    );
}
