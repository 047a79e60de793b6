//! JSON rig documents: a bind-pose skeleton plus named, keyed animations.
//!
//! ```json
//! {
//!   "bones": [
//!     { "name": "root" },
//!     { "name": "spine", "parent": "root", "position": [0, 0, 10], "rotation": [0, 0, 0, 1] }
//!   ],
//!   "animations": {
//!     "nod": [
//!       { "spine": { "rotation": [0.0, 0.0, 0.383, 0.924] } },
//!       {}
//!     ]
//!   }
//! }
//! ```
//!
//! Parents must be declared before their children. Animation keys are offsets relative to the
//! bind pose; bones a key does not mention stay at their bind pose.

use crate::{AnimationClip, BindPoseSource, BoneData, ClipSource, Error, SkeletonData, Transformation};
use glam::{Quat, Vec3, Vec4};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

#[derive(Debug, Deserialize)]
struct Root {
    #[serde(default)]
    bones: Vec<BoneDef>,
    #[serde(default)]
    animations: BTreeMap<String, Vec<BTreeMap<String, TransformDef>>>,
}

#[derive(Debug, Deserialize)]
struct BoneDef {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(flatten)]
    transform: TransformDef,
}

#[derive(Debug, Deserialize)]
struct TransformDef {
    #[serde(default)]
    position: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default = "default_rotation")]
    rotation: [f32; 4],
}

impl TransformDef {
    /// Rotations are normalised; zero-length or non-finite ones are rejected.
    fn to_transformation(&self) -> Result<Transformation, Error> {
        let rotation = Vec4::from_array(self.rotation)
            .try_normalize()
            .map(Quat::from_vec4)
            .ok_or_else(|| Error::InvalidValue {
                message: format!("rotation {:?} is not a valid quaternion", self.rotation),
            })?;
        Ok(Transformation::new(Vec3::from_array(self.position), rotation))
    }
}

/// A parsed rig document. Serves as both [`BindPoseSource`] and [`ClipSource`].
#[derive(Clone, Debug, Default)]
pub struct RigData {
    skeleton: SkeletonData,
    animations: BTreeMap<String, Vec<Vec<Transformation>>>,
}

impl RigData {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: Root = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;

        let mut bones = Vec::new();
        let mut bone_index = HashMap::<String, usize>::new();
        for bone in root.bones {
            let parent = match bone.parent.as_deref() {
                None => None,
                Some(parent_name) => {
                    Some(bone_index.get(parent_name).copied().ok_or_else(|| {
                        Error::JsonUnknownBoneParent {
                            bone: bone.name.clone(),
                            parent: parent_name.to_string(),
                        }
                    })?)
                }
            };

            bone_index.insert(bone.name.clone(), bones.len());
            bones.push(BoneData {
                name: bone.name,
                parent,
                bind: bone.transform.to_transformation()?,
            });
        }

        let mut animations = BTreeMap::new();
        for (name, keys) in root.animations {
            let mut rows = Vec::with_capacity(keys.len());
            for key in keys {
                let mut row = vec![Transformation::IDENTITY; bones.len()];
                for (bone_name, transform) in key {
                    let index = bone_index.get(&bone_name).copied().ok_or_else(|| {
                        Error::JsonUnknownAnimationBone {
                            animation: name.clone(),
                            bone: bone_name.clone(),
                        }
                    })?;
                    row[index] = transform.to_transformation()?;
                }
                rows.push(row);
            }
            animations.insert(name, rows);
        }

        log::debug!(
            "parsed rig with {} bones and {} animations",
            bones.len(),
            animations.len()
        );
        Ok(Self {
            skeleton: SkeletonData { bones },
            animations,
        })
    }

    pub fn skeleton_data(&self) -> &SkeletonData {
        &self.skeleton
    }

    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }

    /// Builds the named clip over every bone of the rig.
    pub fn clip(&self, name: &str) -> Result<AnimationClip, Error> {
        AnimationClip::from_source(self, name, self.skeleton.bones.len())
    }
}

impl BindPoseSource for RigData {
    fn bone_count(&self) -> usize {
        self.skeleton.bone_count()
    }

    fn bone_name(&self, bone: usize) -> &str {
        self.skeleton.bone_name(bone)
    }

    fn bone_parent_index(&self, bone: usize) -> i32 {
        self.skeleton.bone_parent_index(bone)
    }

    fn bone_bind_transform(&self, bone: usize) -> Transformation {
        self.skeleton.bone_bind_transform(bone)
    }
}

impl ClipSource for RigData {
    fn key_count(&self, clip: &str) -> Option<usize> {
        self.animations.get(clip).map(Vec::len)
    }

    fn bone_local_transform(&self, clip: &str, bone: usize, key: usize) -> Transformation {
        self.animations
            .get(clip)
            .and_then(|keys| keys.get(key))
            .and_then(|row| row.get(bone))
            .copied()
            .unwrap_or(Transformation::IDENTITY)
    }
}
