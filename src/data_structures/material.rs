//! Flat colour materials.
//!
//! There are no textures in the scene, so a material is a single uniform with
//! a base colour (lit by ambient + point light) and an emissive colour that is
//! added unlit.

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub colour: [f32; 4],
    // rgb + intensity in w
    pub emissive: [f32; 4],
}

impl MaterialUniform {
    pub fn lit(colour: [f32; 3]) -> Self {
        Self {
            colour: [colour[0], colour[1], colour[2], 1.0],
            emissive: [0.0; 4],
        }
    }

    pub fn emissive(colour: [f32; 3], emissive: [f32; 3], intensity: f32) -> Self {
        Self {
            colour: [colour[0], colour[1], colour[2], 1.0],
            emissive: [emissive[0], emissive[1], emissive[2], intensity],
        }
    }
}

#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        uniform: MaterialUniform,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(name),
        });
        Self {
            name: name.to_string(),
            uniform,
            buffer,
            bind_group,
        }
    }
}

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("material_bind_group_layout"),
    })
}
