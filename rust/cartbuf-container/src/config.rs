//! Allocation parameters for the built-in allocators.

use cartbuf_common::{Result, error::Error};

/// Default alignment of host allocations, in bytes.
pub const DEFAULT_HOST_ALIGNMENT: usize = 64;

/// Default alignment of the first byte of an accelerator allocation.
pub const DEFAULT_DEVICE_BASE_ALIGNMENT: usize = 256;

/// Default row alignment of pitched accelerator allocations. Every row of a 2-D
/// or 3-D device buffer starts at a multiple of this many bytes.
pub const DEFAULT_DEVICE_PITCH_ALIGNMENT: usize = 256;

/// Upper bound for any configured alignment.
pub const MAX_ALIGNMENT: usize = 1 << 21;

/// Configuration of [`HostMemAllocator`](crate::allocator::HostMemAllocator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAllocConfig {
    /// Alignment of the first element, in bytes. The effective alignment is never
    /// below the element type's own alignment.
    pub alignment: usize,
}

impl Default for HostAllocConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_HOST_ALIGNMENT,
        }
    }
}

impl HostAllocConfig {
    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        validate_alignment("alignment", self.alignment)
    }
}

/// Configuration of [`DeviceMemAllocator`](crate::allocator::DeviceMemAllocator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAllocConfig {
    /// Alignment of the first element, in bytes.
    pub base_alignment: usize,
    /// Rows of 2-D and 3-D buffers are padded to a multiple of this many bytes.
    pub pitch_alignment: usize,
}

impl Default for DeviceAllocConfig {
    fn default() -> Self {
        Self {
            base_alignment: DEFAULT_DEVICE_BASE_ALIGNMENT,
            pitch_alignment: DEFAULT_DEVICE_PITCH_ALIGNMENT,
        }
    }
}

impl DeviceAllocConfig {
    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        validate_alignment("base_alignment", self.base_alignment)?;
        validate_alignment("pitch_alignment", self.pitch_alignment)?;
        if self.pitch_alignment > self.base_alignment {
            return Err(Error::invalid_config(format!(
                "pitch_alignment ({}) must not exceed base_alignment ({})",
                self.pitch_alignment, self.base_alignment
            )));
        }
        Ok(())
    }
}

fn validate_alignment(name: &str, alignment: usize) -> Result<()> {
    if !alignment.is_power_of_two() {
        return Err(Error::invalid_config(format!(
            "{name} must be a non-zero power of two, got {alignment}"
        )));
    }
    if alignment > MAX_ALIGNMENT {
        return Err(Error::invalid_config(format!(
            "{name} must not exceed {MAX_ALIGNMENT}, got {alignment}"
        )));
    }
    Ok(())
}
