pub mod collection;
pub mod config_io;
pub mod index;
pub mod store;
