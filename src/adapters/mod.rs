pub mod codec;
pub mod process;
pub mod store;
pub mod wdiff;
