//! Bounded collections used by the pipeline buffers.

pub mod ring_buffer;

pub use ring_buffer::RingBuffer;
