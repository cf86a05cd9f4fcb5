//! Container declarations
//!
//! - [`ContainerSpec`]: the validated description of one container
//! - [`Manifest`]: a JSON file declaring the containers to manage

mod manifest;
mod spec;

pub use manifest::{DeclaredContainer, Manifest, DEFAULT_GROUP};
pub use spec::{render_map, ContainerSpec, ContainerSpecBuilder, DEFAULT_TAG};
