use crate::{BindPoseSource, Error, Transform, TransformTree, Transformation};
use glam::{Quat, Vec3};

const IK_MARKER: &str = "ik";

/// Identity of a skeleton bone. Its transforms live in the owning [`Skeleton`].
#[derive(Clone, Debug)]
pub struct Bone {
    name: String,
    index: usize,
    parent: Option<usize>,
}

impl Bone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    /// Parent bone index; fails for a root bone.
    pub fn parent(&self) -> Result<usize, Error> {
        self.parent.ok_or(Error::NoParent { bone: self.index })
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// IK bones are kept in the hierarchy but excluded from skinning and drawing.
    pub fn is_ik(&self) -> bool {
        self.name.contains(IK_MARKER)
    }
}

/// Ordered bones plus two transform chains sharing the same topology: the current pose and
/// the bind pose.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    pose: TransformTree,
    bind_pose: TransformTree,
}

impl Skeleton {
    /// Builds the skeleton in two passes: unparented bones first, then parent wiring.
    pub fn from_bind_pose(source: &impl BindPoseSource) -> Result<Self, Error> {
        let mut skeleton = Self::default();
        skeleton.create_bones(source);
        skeleton.define_bones_parent(source)?;
        log::debug!("built skeleton with {} bones", skeleton.bones.len());
        Ok(skeleton)
    }

    fn create_bones(&mut self, source: &impl BindPoseSource) {
        for index in 0..source.bone_count() {
            let bind = source.bone_bind_transform(index);
            self.bones.push(Bone {
                name: source.bone_name(index).to_string(),
                index,
                parent: None,
            });
            self.pose.push(bind);
            self.bind_pose.push(bind);
        }
    }

    fn define_bones_parent(&mut self, source: &impl BindPoseSource) -> Result<(), Error> {
        let count = self.bones.len();
        for index in 0..count {
            let Ok(parent) = usize::try_from(source.bone_parent_index(index)) else {
                continue;
            };
            if parent >= count {
                return Err(Error::InvalidHierarchy {
                    bone: index,
                    message: format!("parent index {parent} out of range (len {count})"),
                });
            }
            self.pose.set_parent(index, parent)?;
            self.bind_pose.set_parent(index, parent)?;
            self.bones[index].parent = Some(parent);
        }
        Ok(())
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn ik_bone_count(&self) -> usize {
        self.bones.iter().filter(|b| b.is_ik()).count()
    }

    pub fn bone(&self, index: usize) -> Result<&Bone, Error> {
        self.bones
            .get(index)
            .ok_or_else(|| Error::out_of_range("bone", index, self.bones.len()))
    }

    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn bone_index(&self, name: &str) -> Result<usize, Error> {
        self.find_bone(name)
            .map(Bone::index)
            .ok_or_else(|| Error::UnknownBone {
                name: name.to_string(),
            })
    }

    /// Parent bone of `index`; fails with [`Error::NoParent`] for a root bone.
    pub fn parent_of(&self, index: usize) -> Result<&Bone, Error> {
        let parent = self.bone(index)?.parent()?;
        self.bone(parent)
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = &Bone> + '_ {
        self.bones.iter().filter(move |b| b.parent == Some(index))
    }

    /// Current-pose transform.
    pub fn transform(&self, index: usize) -> Result<&Transform, Error> {
        self.pose.get(index)
    }

    /// Bind-pose transform.
    pub fn default_transform(&self, index: usize) -> Result<&Transform, Error> {
        self.bind_pose.get(index)
    }

    pub fn pose(&self) -> &TransformTree {
        &self.pose
    }

    pub fn bind_pose(&self) -> &TransformTree {
        &self.bind_pose
    }

    pub fn set_bone_relative_position(&mut self, index: usize, offset: Vec3) -> Result<(), Error> {
        let position = self.bind_pose.get(index)?.local_position() + offset;
        self.pose.set_position(index, position)
    }

    pub fn set_bone_relative_rotation(&mut self, index: usize, offset: Quat) -> Result<(), Error> {
        let rotation = self.bind_pose.get(index)?.local_rotation() * offset;
        self.pose.set_rotation(index, rotation)
    }

    /// Poses one bone as an offset from its bind pose; descendants follow before returning.
    pub fn set_bone_relative_transformation(
        &mut self,
        index: usize,
        offset: Transformation,
    ) -> Result<(), Error> {
        let local = self.relative_local(index, &offset)?;
        self.pose.set_local(index, local)
    }

    pub fn reset_bone(&mut self, index: usize) -> Result<(), Error> {
        self.set_bone_relative_transformation(index, Transformation::IDENTITY)
    }

    /// Poses every bone from one offset per bone (in bone order), then propagates once.
    pub fn set_relative_pose(&mut self, offsets: &[Transformation]) -> Result<(), Error> {
        if offsets.len() != self.bones.len() {
            return Err(Error::BoneCountMismatch {
                expected: self.bones.len(),
                actual: offsets.len(),
            });
        }
        let locals = offsets
            .iter()
            .enumerate()
            .map(|(index, offset)| self.relative_local(index, offset))
            .collect::<Result<Vec<_>, _>>()?;
        self.pose.set_locals(&locals)
    }

    pub fn reset_to_bind_pose(&mut self) {
        let locals: Vec<Transformation> = self.bind_pose.iter().map(Transform::local).collect();
        // Both trees have the same length by construction.
        if let Err(err) = self.pose.set_locals(&locals) {
            log::warn!("failed to reset skeleton to bind pose: {err}");
        }
    }

    fn relative_local(&self, index: usize, offset: &Transformation) -> Result<Transformation, Error> {
        let bind = self.bind_pose.get(index)?.local();
        Ok(Transformation::new(
            bind.position + offset.position,
            bind.rotation * offset.rotation,
        ))
    }
}
