//! Growable GPU buffer for per-frame data whose size tracks scene content.

/// A GPU buffer that grows (2x) when a write exceeds its capacity.
///
/// Never shrinks. A reallocation replaces the underlying `wgpu::Buffer`, so
/// any bind group referencing it must be rebuilt.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(256);
        Self {
            buffer: create(device, label, capacity, usage),
            capacity,
            usage,
            label: label.to_owned(),
        }
    }

    /// Write `data` at offset zero, growing first if needed.
    ///
    /// Returns `true` if the buffer was reallocated.
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len();
        let reallocated = needed > self.capacity;
        if reallocated {
            self.capacity = (needed * 2).max(self.capacity * 2);
            self.buffer = create(device, &self.label, self.capacity, self.usage);
            log::debug!(
                "{} grown to {} bytes",
                self.label,
                self.capacity
            );
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        reallocated
    }

    /// The current GPU buffer. Re-fetch it after a reallocating write.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

fn create(
    device: &wgpu::Device,
    label: &str,
    capacity: usize,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: capacity as u64,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::render_context::RenderContext;

    #[test]
    fn grows_only_when_data_exceeds_capacity() {
        let Ok(context) = pollster::block_on(RenderContext::headless(4, 4))
        else {
            return;
        };
        let mut buffer = DynamicBuffer::new(
            &context.device,
            "Test Buffer",
            16,
            wgpu::BufferUsages::UNIFORM,
        );
        assert_eq!(buffer.capacity, 256);

        assert!(!buffer.write_bytes(&context.device, &context.queue, &[1; 256]));
        assert!(buffer.write_bytes(&context.device, &context.queue, &[1; 300]));
        assert_eq!(buffer.capacity, 600);
        assert_eq!(buffer.buffer().size(), 600);
        assert!(!buffer.write_bytes(&context.device, &context.queue, &[]));
    }

    #[test]
    fn reallocated_buffer_keeps_usage_and_copy_dst() {
        let Ok(context) = pollster::block_on(RenderContext::headless(4, 4))
        else {
            return;
        };
        let mut buffer = DynamicBuffer::new(
            &context.device,
            "Test Buffer",
            0,
            wgpu::BufferUsages::STORAGE,
        );
        assert!(buffer.write_bytes(&context.device, &context.queue, &[0; 512]));
        let usage = buffer.buffer().usage();
        assert!(usage.contains(wgpu::BufferUsages::STORAGE));
        assert!(usage.contains(wgpu::BufferUsages::COPY_DST));
        assert_eq!(buffer.buffer().size(), 1024);
    }
}
