//! Growable GPU buffers.
//!
//! Geometry regenerated at runtime (the spray cone, the axes helper) is
//! rewritten into the same buffer when it fits and reallocated at twice
//! the needed size when it does not.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// Smallest allocation, in bytes.
const MIN_CAPACITY: usize = 64;

/// Capacity after an upload of `needed` bytes into `current`. Grows to
/// twice the request, and by at least 1 KiB, so repeated small growth does
/// not reallocate every frame.
const fn grown_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        return current;
    }
    let doubled = needed * 2;
    let stepped = current + 1024;
    if doubled > stepped { doubled } else { stepped }
}

/// A GPU buffer that grows on demand and never shrinks.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer initialized from `data`.
    pub fn new_with_data<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        data: &[T],
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let buffer = if bytes.is_empty() {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: MIN_CAPACITY as u64,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
        };

        Self {
            buffer,
            capacity: bytes.len().max(MIN_CAPACITY),
            usage,
            label: label.to_owned(),
        }
    }

    /// Write `data`, growing the buffer if it does not fit.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups that
    /// reference it need recreation).
    pub fn write<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let needed = bytes.len();

        let new_capacity = grown_capacity(self.capacity, needed);
        let reallocated = new_capacity != self.capacity;
        if reallocated {
            log::debug!(
                "growing buffer '{}' {} -> {} bytes",
                self.label,
                self.capacity,
                new_capacity
            );
            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: new_capacity as u64,
                usage: self.usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.capacity = new_capacity;
        }

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        reallocated
    }

    /// Underlying wgpu buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Release the GPU allocation now rather than on drop.
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// [`DynamicBuffer`] that counts items instead of bytes.
pub struct TypedBuffer<T> {
    inner: DynamicBuffer,
    count: usize,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// Typed buffer initialized from `data`.
    pub fn new_with_data(
        device: &wgpu::Device,
        label: &str,
        data: &[T],
        usage: wgpu::BufferUsages,
    ) -> Self {
        Self {
            inner: DynamicBuffer::new_with_data(device, label, data, usage),
            count: data.len(),
            _marker: PhantomData,
        }
    }

    /// Write `data`, growing if necessary. Returns `true` on reallocation.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> bool {
        self.count = data.len();
        self.inner.write(device, queue, data)
    }

    /// Underlying wgpu buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.inner.buffer()
    }

    /// Number of elements written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the buffer holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Release the GPU allocation now rather than on drop.
    pub fn destroy(&self) {
        self.inner.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitting_upload_keeps_capacity() {
        assert_eq!(grown_capacity(256, 0), 256);
        assert_eq!(grown_capacity(256, 256), 256);
    }

    #[test]
    fn growth_doubles_or_steps() {
        assert_eq!(grown_capacity(64, 4096), 8192);
        // Doubling 300 would undershoot the 1 KiB step.
        assert_eq!(grown_capacity(256, 300), 1280);
    }
}
