pub mod ufunc_error;
pub use ufunc_error::*;

pub mod ufunc_impl;
pub use ufunc_impl::*;

pub mod ufunc_registry;
pub use ufunc_registry::*;

pub mod functions;
pub use functions::*;
