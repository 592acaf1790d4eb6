pub mod persistence;
pub mod timer;
