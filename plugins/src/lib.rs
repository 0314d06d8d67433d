pub mod export;
pub mod factory;
pub mod process;
