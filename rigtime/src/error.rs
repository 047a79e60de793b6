use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("bone {bone} has no parent")]
    NoParent { bone: usize },

    #[error("invalid clip '{name}': {message}")]
    InvalidClip { name: String, message: String },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("invalid hierarchy at bone {bone}: {message}")]
    InvalidHierarchy { bone: usize, message: String },

    #[error("bone count mismatch: expected {expected}, got {actual}")]
    BoneCountMismatch { expected: usize, actual: usize },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("unknown bone: {name}")]
    UnknownBone { name: String },

    #[error("setting '{key}' is not a {expected}")]
    SettingType { key: String, expected: &'static str },

    #[cfg(feature = "json")]
    #[error("failed to parse rig JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("unknown parent bone '{parent}' for bone '{bone}'")]
    JsonUnknownBoneParent { bone: String, parent: String },

    #[cfg(feature = "json")]
    #[error("unknown bone '{bone}' referenced by animation '{animation}'")]
    JsonUnknownAnimationBone { animation: String, bone: String },
}

impl Error {
    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange { what, index, len }
    }
}
