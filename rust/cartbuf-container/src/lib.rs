//! Pitched 1-, 2- and 3-dimensional buffers for host and accelerator memory.
//!
//! The central type is [`CartBuffer`], a shared-ownership handle to a pitched
//! memory region, parameterized by three memory policies:
//!
//! - an [`Allocator`](allocator::Allocator) that obtains and releases the region,
//! - a [`Copier`](copier::Copier) that copies element data within one memory space,
//! - an [`Assigner`](assigner::Assigner) that broadcasts a value into a buffer.
//!
//! [`HostBuffer`] and [`DeviceBuffer`] fix these policies for the host and the
//! accelerator memory space. Cloning a buffer aliases its memory; moving element
//! data between memory spaces is an explicit, shape-checked transfer
//! ([`CartBuffer::assign_from_accelerator`], [`CartBuffer::assign_from_host`]).

pub mod allocator;
pub mod assigner;
pub mod cart_buffer;
pub mod config;
pub mod copier;
pub mod device_buffer;
pub mod element;
pub mod host_buffer;
pub mod memcopy;
pub mod space;


pub use cart_buffer::{CartBuffer, Ownership, SendableBuffer};
pub use device_buffer::DeviceBuffer;
pub use element::Element;
pub use host_buffer::HostBuffer;

pub use cartbuf_common::{Result, error::Error, error::ErrorKind};
pub use cartbuf_common_traits::{
    memory_space::{Device, Host, MemoryKind, MemorySpace},
    pitched_region::PitchedRegion,
};
pub use cartbuf_geometry::{Pitch, Size};
