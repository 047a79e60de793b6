use glam::{Mat4, Quat, Vec3};

/// A position paired with a rotation. Used both for absolute local transforms and for
/// offsets relative to a bind pose.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transformation {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transformation {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
        }
    }

    /// Translation then rotation, as a single affine matrix.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Linear position blend and shortest-path spherical rotation blend.
    pub fn interpolate(&self, other: &Self, alpha: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, alpha),
            rotation: self.rotation.slerp(other.rotation, alpha),
        }
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Debug)]
pub struct BoneData {
    pub name: String,
    pub parent: Option<usize>,
    pub bind: Transformation,
}

/// In-memory bind pose, in external bone-definition order.
#[derive(Clone, Debug, Default)]
pub struct SkeletonData {
    pub bones: Vec<BoneData>,
}

impl SkeletonData {
    pub fn bone(&self, name: &str) -> Option<(usize, &BoneData)> {
        self.bones.iter().enumerate().find(|(_, b)| b.name == name)
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone(name).map(|(index, _)| index)
    }
}

/// Bind-pose query provided by the host.
///
/// Implementations are only asked about bones in `0..bone_count()`.
pub trait BindPoseSource {
    fn bone_count(&self) -> usize;

    fn bone_name(&self, bone: usize) -> &str;

    /// Parent bone index, or a negative value (conventionally `-1`) for a root.
    fn bone_parent_index(&self, bone: usize) -> i32;

    /// Local (parent-relative) bind transform.
    fn bone_bind_transform(&self, bone: usize) -> Transformation;
}

impl BindPoseSource for SkeletonData {
    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn bone_name(&self, bone: usize) -> &str {
        self.bones.get(bone).map(|b| b.name.as_str()).unwrap_or("")
    }

    fn bone_parent_index(&self, bone: usize) -> i32 {
        self.bones
            .get(bone)
            .and_then(|b| b.parent)
            .and_then(|p| i32::try_from(p).ok())
            .unwrap_or(-1)
    }

    fn bone_bind_transform(&self, bone: usize) -> Transformation {
        self.bones
            .get(bone)
            .map(|b| b.bind)
            .unwrap_or(Transformation::IDENTITY)
    }
}

/// Named clip query provided by the host.
pub trait ClipSource {
    /// Number of keys of the named clip, `None` if the host does not know it.
    fn key_count(&self, clip: &str) -> Option<usize>;

    /// Transform of `bone` at `key`, relative to the bone's bind pose.
    fn bone_local_transform(&self, clip: &str, bone: usize, key: usize) -> Transformation;
}

/// Receives the flattened skinning matrices (row-major, 16 floats per bone).
pub trait SkinningSink {
    fn set_skinning_pose(&mut self, matrices: &[f32], bone_count: usize);
}
