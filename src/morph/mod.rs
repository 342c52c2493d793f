pub mod morph_error;
pub use morph_error::*;

pub mod morph_state;
pub use morph_state::*;

pub mod morpher;
pub use morpher::*;

pub mod helpers;

pub mod spatial_index;
pub use spatial_index::insert_q3c_calls;

pub mod pg_sphere;
pub use pg_sphere::morph_pgsphere;

pub mod syntax;
pub use syntax::morph_syntax;
