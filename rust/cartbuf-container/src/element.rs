/// Element types storable in a pitched buffer.
///
/// Elements are plain old data: any bit pattern is valid, so freshly allocated
/// (zeroed) memory and memory copied byte-wise between spaces is always a valid
/// sequence of elements.
pub trait Element: bytemuck::Pod + Send + Sync {}

impl<T> Element for T where T: bytemuck::Pod + Send + Sync {}
