//! wgpu device-dispatch backend.
//!
//! Setup happens once per instance: pick a hardware adapter, open its device
//! and single queue, compile the WGSL kernel. Each transform call then runs
//! the full protocol on its own: build the pipeline with the call's work-group
//! shape, allocate buffers, copy the image in, dispatch, copy the result back
//! and wait for the queue to drain. Nothing is reused between calls.

use std::borrow::Cow;
use std::fs;

use bytemuck::{Pod, Zeroable};
use pixbench_core::{ChannelOrder, Image};
use tracing::{debug, info, trace};
use wgpu::util::DeviceExt;

use super::{BackendKind, BackendOptions, PixelBackend, WorkGroupLimits, WorkGroupShape};
use crate::{ComputeError, ComputeResult, blur, hsv, shaders};

// =============================================================================
// Uniform Buffer
// =============================================================================

/// Kernel parameters uniform: [width, height, channels, radius]
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Params {
    width: u32,
    height: u32,
    channels: u32,
    radius: u32,
}

// =============================================================================
// Call-scoped buffers
// =============================================================================

/// Buffers for one transform call.
///
/// Dropping the guard destroys every buffer, whichever way the call exits.
pub struct DeviceBuffers {
    input: wgpu::Buffer,
    output: wgpu::Buffer,
    params: wgpu::Buffer,
    staging: wgpu::Buffer,
    len: usize,
    size: u64,
}

impl DeviceBuffers {
    /// Allocates input, output, parameter and staging buffers for `image`.
    ///
    /// The input is left empty; the caller copies pixel data in.
    pub fn new(device: &wgpu::Device, image: &Image, radius: u32) -> Self {
        let len = image.size_bytes();
        let size = Self::padded_size(len);
        let (width, height, channels) = image.dimensions();

        let input = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("input_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("output_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("params_uniform"),
            contents: bytemuck::bytes_of(&Params { width, height, channels, radius }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self { input, output, params, staging, len, size }
    }

    /// Byte size rounded up to the copy alignment.
    pub fn padded_size(len: usize) -> u64 {
        (len as u64)
            .next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
            .max(wgpu::COPY_BUFFER_ALIGNMENT)
    }

    /// Largest buffer one call may bind as storage under `limits`.
    pub fn max_size(limits: &wgpu::Limits) -> u64 {
        limits.max_buffer_size.min(u64::from(limits.max_storage_buffer_binding_size))
    }

    /// True when an image of `len` bytes can be bound under `limits`.
    pub fn fits(len: usize, limits: &wgpu::Limits) -> bool {
        Self::padded_size(len) <= Self::max_size(limits)
    }

    /// Image bytes (unpadded).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the image has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size of each storage buffer.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for DeviceBuffers {
    fn drop(&mut self) {
        self.input.destroy();
        self.output.destroy();
        self.params.destroy();
        self.staging.destroy();
    }
}

// =============================================================================
// DeviceBackend
// =============================================================================

/// GPU backend driving the bundled (or user-supplied) WGSL kernel.
pub struct DeviceBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    module: wgpu::ShaderModule,
    adapter: wgpu::AdapterInfo,
    limits: WorkGroupLimits,
}

impl DeviceBackend {
    /// Check if a hardware GPU adapter is present.
    pub fn is_available() -> bool {
        select_adapter(&new_instance()).is_some()
    }

    /// Create new device backend.
    pub fn new(options: &BackendOptions) -> ComputeResult<Self> {
        pollster::block_on(Self::new_async(options))
    }

    /// Create new device backend asynchronously.
    pub async fn new_async(options: &BackendOptions) -> ComputeResult<Self> {
        let source = load_kernel_source(options)?;

        let instance = new_instance();
        let adapter = select_adapter(&instance).ok_or(ComputeError::NoAdapter)?;
        let info = adapter.get_info();
        info!(
            adapter = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pixbench_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter_limits.clone(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| ComputeError::DeviceCreation(e.to_string()))?;

        let module = compile_kernel(&device, &source).await?;
        let limits = WorkGroupLimits::from(&device.limits());

        Ok(Self { device, queue, module, adapter: info, limits })
    }

    /// Name of the selected adapter.
    pub fn adapter_name(&self) -> &str {
        &self.adapter.name
    }

    /// Limits the work-group geometry is derived from.
    pub fn limits(&self) -> &WorkGroupLimits {
        &self.limits
    }

    fn create_pipeline(&self, entry: &str, shape: &WorkGroupShape) -> ComputeResult<wgpu::ComputePipeline> {
        let constants = shape.override_constants();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(entry),
            layout: None, // Auto layout
            module: &self.module,
            entry_point: Some(entry),
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &constants,
                zero_initialize_workgroup_memory: true,
            },
            cache: None,
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ComputeError::ShaderCompilation(format!("pipeline '{entry}': {err}")));
        }
        Ok(pipeline)
    }

    /// Allocates buffers, uploads `input` and submits one dispatch plus the
    /// read-back copy. Errors land in the caller's error scopes.
    fn encode_and_submit(
        &self,
        pipeline: &wgpu::ComputePipeline,
        shape: &WorkGroupShape,
        input: &Image,
        radius: u32,
    ) -> DeviceBuffers {
        let buffers = DeviceBuffers::new(&self.device, input, radius);

        // Host -> device
        let bytes: Cow<'_, [u8]> = if buffers.len() as u64 == buffers.size() {
            Cow::Borrowed(input.data())
        } else {
            let mut padded = input.data().to_vec();
            padded.resize(buffers.size() as usize, 0);
            Cow::Owned(padded)
        };
        self.queue.write_buffer(&buffers.input, 0, &bytes);

        let layout = pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pixel_ops_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: buffers.input.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: buffers.output.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: buffers.params.as_entire_binding() },
            ],
        });

        let groups = shape.groups();
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("compute_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("compute_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups[0], groups[1], groups[2]);
        }
        // Device -> host
        encoder.copy_buffer_to_buffer(&buffers.output, 0, &buffers.staging, 0, buffers.size());
        self.queue.submit(std::iter::once(encoder.finish()));

        buffers
    }

    /// Runs one kernel over `input` and reads the result back as `order`.
    fn run(&mut self, entry: &str, input: &Image, radius: u32, order: ChannelOrder) -> ComputeResult<Image> {
        let (width, height, _) = input.dimensions();

        let shape = WorkGroupShape::for_image(width, height, &self.limits);
        let groups = shape.groups();
        if groups[0] > self.limits.max_groups_per_dim || groups[1] > self.limits.max_groups_per_dim {
            return Err(ComputeError::ImageTooLarge {
                width,
                height,
                what: "dispatch",
                limit: u64::from(self.limits.max_groups_per_dim.saturating_mul(shape.local[0].min(shape.local[1]))),
            });
        }
        let device_limits = self.device.limits();
        if !DeviceBuffers::fits(input.size_bytes(), &device_limits) {
            return Err(ComputeError::ImageTooLarge {
                width,
                height,
                what: "storage buffer",
                limit: DeviceBuffers::max_size(&device_limits),
            });
        }
        debug!(entry, local = ?shape.local, global = ?shape.global, groups = ?groups, "dispatch geometry");

        let pipeline = self.create_pipeline(entry, &shape)?;

        // Nothing may return between push and pop.
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let buffers = self.encode_and_submit(&pipeline, &shape, input, radius);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());
        if let Some(err) = oom.or(validation) {
            return Err(ComputeError::OperationFailed(format!("Device rejected '{entry}' dispatch: {err}")));
        }

        let slice = buffers.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| ComputeError::OperationFailed("Map channel closed".into()))?
            .map_err(|e| ComputeError::OperationFailed(format!("Map failed: {e}")))?;

        let mapped = slice.get_mapped_range();
        let data = mapped[..buffers.len()].to_vec();
        drop(mapped);
        buffers.staging.unmap();

        Ok(Image::from_raw(data, width, height, order)?)
    }
}

impl PixelBackend for DeviceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Device
    }

    fn convert_color_space(&mut self, input: &Image) -> ComputeResult<Image> {
        let order = hsv::output_order(input)?;
        trace!(width = input.width(), height = input.height(), "device::convert_color_space");
        self.run(shaders::HSV_ENTRY, input, 0, order)
    }

    fn apply_box_blur(&mut self, input: &Image, radius: u32) -> ComputeResult<Image> {
        blur::validate(input, radius)?;
        trace!(width = input.width(), height = input.height(), radius, "device::apply_box_blur");
        self.run(shaders::BLUR_ENTRY, input, radius, input.order())
    }
}

// =============================================================================
// Setup helpers
// =============================================================================

fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Preference among adapter types; `None` rejects software rasterizers.
fn adapter_rank(device_type: wgpu::DeviceType) -> Option<u8> {
    match device_type {
        wgpu::DeviceType::DiscreteGpu => Some(0),
        wgpu::DeviceType::IntegratedGpu => Some(1),
        wgpu::DeviceType::VirtualGpu => Some(2),
        wgpu::DeviceType::Other => Some(3),
        wgpu::DeviceType::Cpu => None,
    }
}

fn select_adapter(instance: &wgpu::Instance) -> Option<wgpu::Adapter> {
    instance
        .enumerate_adapters(wgpu::Backends::all())
        .into_iter()
        .filter_map(|adapter| {
            let info = adapter.get_info();
            debug!(name = %info.name, backend = ?info.backend, device_type = ?info.device_type, "adapter");
            adapter_rank(info.device_type).map(|rank| (rank, adapter))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, adapter)| adapter)
}

fn load_kernel_source(options: &BackendOptions) -> ComputeResult<Cow<'static, str>> {
    match &options.kernel_path {
        Some(path) => {
            debug!(path = %path.display(), "loading kernel source");
            fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| ComputeError::KernelSource { path: path.clone(), source })
        }
        None => Ok(Cow::Borrowed(shaders::PIXEL_OPS)),
    }
}

/// Compiles WGSL inside a validation scope, collecting compiler messages.
async fn compile_kernel(device: &wgpu::Device, source: &str) -> ComputeResult<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("pixel_ops"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let scope_error = device.pop_error_scope().await;

    let diagnostics: Vec<String> = module
        .get_compilation_info()
        .await
        .messages
        .iter()
        .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();

    match scope_error {
        Some(_) if !diagnostics.is_empty() => Err(ComputeError::ShaderCompilation(diagnostics.join("\n"))),
        Some(err) => Err(ComputeError::ShaderCompilation(err.to_string())),
        None if !diagnostics.is_empty() => Err(ComputeError::ShaderCompilation(diagnostics.join("\n"))),
        None => Ok(module),
    }
}
