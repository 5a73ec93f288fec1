pub mod config;
pub mod memory_container;

pub use memory_container::{InMemoryContainer, LaunchOptions};
