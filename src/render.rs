//! Render composition.
//!
//! Flows describe what they want drawn with a [`Render`] tree. The frame loop
//! flattens every flow's tree into one list of [`Instanced`] draws that all go
//! through the lit pipeline.

use crate::data_structures::{instance::InstanceBuffer, material::Material, mesh::Mesh};

/// One instanced draw: a mesh, its material and the instance buffer.
#[derive(Clone, Copy)]
pub struct Instanced<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a Material,
    pub instance: &'a wgpu::Buffer,
    pub amount: usize,
}

impl<'a> Instanced<'a> {
    pub fn single(mesh: &'a Mesh, material: &'a Material, instance: &'a InstanceBuffer) -> Self {
        Self {
            mesh,
            material,
            instance: &instance.buffer,
            amount: 1,
        }
    }
}

/// Specifies how a flow's objects should be rendered.
///
/// - `Default(T)` renders a single object
/// - `Defaults(Vec<T>)` renders a batch of objects
/// - `Composed(Vec<Composition<T>>)` recursively renders a composition
///
/// An empty `Defaults` renders nothing.
pub enum Composition<T> {
    Default(T),
    Defaults(Vec<T>),
    Composed(Vec<Composition<T>>),
}

/// What flows hand to the frame loop: a tree of instanced draws.
pub type Render<'a> = Composition<Instanced<'a>>;

impl<T> Composition<T> {
    /// Flatten the tree depth first, keeping the order the flow gave.
    pub(crate) fn collect(self, draws: &mut Vec<T>) {
        match self {
            Composition::Default(item) => draws.push(item),
            Composition::Defaults(mut vec) => draws.append(&mut vec),
            Composition::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(draws)),
        }
    }
}
