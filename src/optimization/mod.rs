pub mod audit;
pub mod builder;
pub mod extract;
