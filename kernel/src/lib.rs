// Tailview Kernel
//
// Core pipeline primitives for the live log viewer:
// stream → buffer → filter/search → windowed viewport.

pub mod buffer;
pub mod filter;
pub mod record;
pub mod stream;
pub mod viewer;
pub mod window;
