pub mod batch;
pub mod generator;
pub mod log_buffer;
pub mod remote;
