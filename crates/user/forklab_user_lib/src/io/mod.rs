//! Output buffers, input accumulators and unbuffered standard streams.

pub use self::{accumulator::InputAccumulator, buffer::OutputBuffer, stdio::*};

mod accumulator;
mod buffer;
mod stdio;
