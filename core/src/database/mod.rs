pub mod batch_operations;
pub mod postgres;
