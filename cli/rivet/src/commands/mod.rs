pub mod boards;
pub mod build;
pub mod load;
