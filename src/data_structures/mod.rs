//! Engine data structures: meshes, materials, instances and textures.
//!
//! - `mesh` holds the vertex layout and GPU buffers for a single mesh
//! - `material` is the per-mesh colour uniform (base colour + emissive)
//! - `instance` holds per-instance transformation data
//! - `texture` wraps the depth buffer

pub mod instance;
pub mod material;
pub mod mesh;
pub mod texture;
