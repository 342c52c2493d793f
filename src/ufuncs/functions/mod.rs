pub mod match_impl;
pub use match_impl::*;

pub mod nocasecmp_impl;
pub use nocasecmp_impl::*;

pub mod hasword_impl;
pub use hasword_impl::*;

pub mod hashlist_impl;
pub use hashlist_impl::*;
