pub mod region_error;
pub use region_error::*;

pub mod stc_region;
pub use stc_region::*;

pub mod stcs;
pub use stcs::*;

pub mod named_object;
pub use named_object::*;

pub mod registry;
pub use registry::*;
