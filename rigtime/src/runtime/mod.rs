mod animation;
mod animator;
mod skeleton;
mod skinning;
mod timeline;
mod transform;

pub use animation::*;
pub use animator::*;
pub use skeleton::*;
pub use skinning::*;
pub use timeline::*;
pub use transform::*;


#[cfg(test)]
mod skeleton_tests;


#[cfg(test)]
mod timeline_tests;
