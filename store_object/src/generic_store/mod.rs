mod binding;
pub mod core;
pub mod memory;
pub mod store_object;

pub use core::GenericStore;
pub use memory::MemoryStore;
