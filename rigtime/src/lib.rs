//! Keyframe timeline and skeletal pose runtime.
//!
//! This crate drives frame-by-frame skeletal animation playback: a timeline state machine
//! advances through the keys of a clip, an animator blends the bracketing keys (and
//! transitions between clips), and the resulting bone offsets are propagated through the
//! skeleton hierarchy to produce skinning matrices.
//!
//! The crate is renderer-agnostic. Hosts feed bind-pose and clip data through the
//! [`BindPoseSource`] / [`ClipSource`] traits and receive skinning data through
//! [`SkinningSink`].

#![forbid(unsafe_code)]

mod config;
mod error;
mod model;
mod render;
mod runtime;

#[cfg(feature = "json")]
pub mod json;

pub use config::*;
pub use error::*;
pub use model::*;
pub use render::*;
pub use runtime::*;

pub use glam::{Mat4, Quat, Vec3};

#[cfg(test)]
mod config_tests;
