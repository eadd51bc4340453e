//! Public entry points: the JSON request facade and the C ABI over it.

pub mod ffi;
pub mod handlers;
pub mod wire;

pub use handlers::{Engine, Response, API_VERSION};
