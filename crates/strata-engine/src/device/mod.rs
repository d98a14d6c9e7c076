//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating and configuring the Surface
//! - acquiring frames and handing out encoders and views

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
