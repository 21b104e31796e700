// src/acquisition/mod.rs
//! Sample acquisition: ring buffering and the producer stage

pub mod ring_buffer;
pub mod stage;

pub use ring_buffer::SampleRingBuffer;
pub use stage::AcquisitionStage;
