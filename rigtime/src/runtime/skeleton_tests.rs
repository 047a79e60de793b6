use crate::{BindPoseSource, BoneData, Error, Skeleton, SkeletonData, Transformation};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_vec3_approx(actual: Vec3, expected: Vec3) {
    assert_approx(actual.x, expected.x);
    assert_approx(actual.y, expected.y);
    assert_approx(actual.z, expected.z);
}

fn bone(name: &str, parent: Option<usize>, position: Vec3) -> BoneData {
    BoneData {
        name: name.to_string(),
        parent,
        bind: Transformation::from_position(position),
    }
}

fn arm_data() -> SkeletonData {
    SkeletonData {
        bones: vec![
            bone("root", None, Vec3::new(0.0, 0.0, 1.0)),
            bone("upper_arm", Some(0), Vec3::new(2.0, 0.0, 0.0)),
            bone("lower_arm", Some(1), Vec3::new(3.0, 0.0, 0.0)),
            bone("hand_ik", Some(0), Vec3::new(5.0, 0.0, 0.0)),
        ],
    }
}

/// Host-style source that reports parents with raw indices.
struct RawSource {
    names: Vec<&'static str>,
    parents: Vec<i32>,
}

impl BindPoseSource for RawSource {
    fn bone_count(&self) -> usize {
        self.names.len()
    }

    fn bone_name(&self, bone: usize) -> &str {
        self.names[bone]
    }

    fn bone_parent_index(&self, bone: usize) -> i32 {
        self.parents[bone]
    }

    fn bone_bind_transform(&self, _bone: usize) -> Transformation {
        Transformation::from_position(Vec3::X)
    }
}

#[test]
fn from_bind_pose_builds_hierarchy() {
    let skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();

    assert_eq!(skeleton.bone_count(), 4);
    assert_eq!(skeleton.ik_bone_count(), 1);
    assert!(skeleton.bone(0).unwrap().is_root());
    assert_eq!(skeleton.bone(2).unwrap().parent_index(), Some(1));
    assert_eq!(skeleton.parent_of(2).unwrap().name(), "upper_arm");
    assert_eq!(skeleton.bone_index("hand_ik").unwrap(), 3);
    assert!(skeleton.bone(3).unwrap().is_ik());

    assert_vec3_approx(
        skeleton.transform(2).unwrap().world_position(),
        Vec3::new(5.0, 0.0, 1.0),
    );
    assert_vec3_approx(
        skeleton.default_transform(2).unwrap().world_position(),
        Vec3::new(5.0, 0.0, 1.0),
    );
}

#[test]
fn negative_parent_index_means_root() {
    let source = RawSource {
        names: vec!["a", "b"],
        parents: vec![-1, 0],
    };
    let skeleton = Skeleton::from_bind_pose(&source).unwrap();
    assert!(skeleton.bone(0).unwrap().is_root());
    assert_vec3_approx(
        skeleton.transform(1).unwrap().world_position(),
        Vec3::new(2.0, 0.0, 0.0),
    );
}

#[test]
fn out_of_range_parent_index_is_rejected() {
    let source = RawSource {
        names: vec!["a", "b"],
        parents: vec![-1, 7],
    };
    assert!(matches!(
        Skeleton::from_bind_pose(&source),
        Err(Error::InvalidHierarchy { bone: 1, .. })
    ));
}

#[test]
fn root_bone_has_no_parent() {
    let skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    assert!(matches!(
        skeleton.bone(0).unwrap().parent(),
        Err(Error::NoParent { bone: 0 })
    ));
    assert!(matches!(
        skeleton.parent_of(0),
        Err(Error::NoParent { bone: 0 })
    ));
}

#[test]
fn bone_lookup_errors() {
    let skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    assert!(matches!(
        skeleton.bone(4),
        Err(Error::OutOfRange { index: 4, len: 4, .. })
    ));
    assert!(matches!(
        skeleton.bone_index("tail"),
        Err(Error::UnknownBone { .. })
    ));
}

#[test]
fn relative_position_is_added_to_bind_pose_and_cascades() {
    let mut skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    skeleton
        .set_bone_relative_position(1, Vec3::new(0.0, 1.0, 0.0))
        .unwrap();

    assert_vec3_approx(
        skeleton.transform(1).unwrap().local_position(),
        Vec3::new(2.0, 1.0, 0.0),
    );
    assert_vec3_approx(
        skeleton.transform(2).unwrap().world_position(),
        Vec3::new(5.0, 1.0, 1.0),
    );
    // The bind pose never moves.
    assert_vec3_approx(
        skeleton.default_transform(2).unwrap().world_position(),
        Vec3::new(5.0, 0.0, 1.0),
    );
}

#[test]
fn relative_rotation_composes_with_bind_rotation() {
    let mut skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    skeleton
        .set_bone_relative_rotation(1, Quat::from_rotation_z(FRAC_PI_2))
        .unwrap();

    assert_vec3_approx(
        skeleton.transform(2).unwrap().world_position(),
        Vec3::new(2.0, 3.0, 1.0),
    );
}

#[test]
fn set_relative_pose_requires_one_offset_per_bone() {
    let mut skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    let err = skeleton
        .set_relative_pose(&[Transformation::IDENTITY; 3])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::BoneCountMismatch {
            expected: 4,
            actual: 3
        }
    ));
}

#[test]
fn reset_to_bind_pose_restores_every_bone() {
    let mut skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    let offsets = [Transformation::from_position(Vec3::ONE); 4];
    skeleton.set_relative_pose(&offsets).unwrap();
    assert_vec3_approx(
        skeleton.transform(0).unwrap().world_position(),
        Vec3::new(1.0, 1.0, 2.0),
    );

    skeleton.reset_to_bind_pose();
    for index in 0..skeleton.bone_count() {
        assert_eq!(
            skeleton.transform(index).unwrap().world_matrix(),
            skeleton.default_transform(index).unwrap().world_matrix()
        );
    }
}

#[test]
fn reset_bone_only_touches_that_bone() {
    let mut skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    skeleton
        .set_bone_relative_position(2, Vec3::new(0.0, 0.0, 4.0))
        .unwrap();
    skeleton
        .set_bone_relative_position(1, Vec3::new(0.0, 0.0, 1.0))
        .unwrap();

    skeleton.reset_bone(1).unwrap();
    assert_vec3_approx(
        skeleton.transform(2).unwrap().world_position(),
        Vec3::new(5.0, 0.0, 5.0),
    );
}

#[test]
fn children_of_root() {
    let skeleton = Skeleton::from_bind_pose(&arm_data()).unwrap();
    let names: Vec<&str> = skeleton.children(0).map(|b| b.name()).collect();
    assert_eq!(names, vec!["upper_arm", "hand_ik"]);
}
