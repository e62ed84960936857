#[cfg(test)]
pub mod memory;
pub mod mysql;
pub mod service;
pub mod store;
