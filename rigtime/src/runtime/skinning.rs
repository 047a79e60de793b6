use crate::Skeleton;
use byteorder::{LittleEndian, WriteBytesExt};
use glam::Mat4;
use std::io::{self, Write};

/// Skinning matrices (`current_world * inverse(bind_world)`) for every non-IK bone, in
/// skeleton order.
///
/// IK bones are skipped, so the export is shorter than the skeleton whenever it has IK
/// bones; [`SkinningPose::bone_indices`] maps each entry back to its bone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinningPose {
    matrices: Vec<Mat4>,
    bone_indices: Vec<usize>,
    row_major: Vec<f32>,
}

impl SkinningPose {
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let mut out = Self::default();
        out.rebuild(skeleton);
        out
    }

    pub fn rebuild(&mut self, skeleton: &Skeleton) {
        self.matrices.clear();
        self.bone_indices.clear();
        self.row_major.clear();

        let transforms = skeleton
            .pose()
            .iter()
            .zip(skeleton.bind_pose().iter());
        for (bone, (current, bind)) in skeleton.bones().iter().zip(transforms) {
            if bone.is_ik() {
                continue;
            }
            let matrix = *current.world_matrix() * bind.world_matrix().inverse();
            self.matrices.push(matrix);
            self.bone_indices.push(bone.index());
            self.row_major
                .extend_from_slice(&matrix.transpose().to_cols_array());
        }
    }

    pub fn bone_count(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn bone_indices(&self) -> &[usize] {
        &self.bone_indices
    }

    /// 16 floats per bone, row-major.
    pub fn as_row_major(&self) -> &[f32] {
        &self.row_major
    }

    /// Writes [`Self::as_row_major`] as little-endian `f32`s.
    pub fn write_le<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for value in &self.row_major {
            out.write_f32::<LittleEndian>(*value)?;
        }
        Ok(())
    }
}
