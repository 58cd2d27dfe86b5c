pub mod cli;
pub mod dates;
pub mod editor;
pub mod io;
pub mod model;
pub mod ops;
