pub mod classifier;
pub mod normalized;
pub mod summary;
