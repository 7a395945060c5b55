pub mod disk;
pub mod memory;

pub use disk::JsonFileStore;
pub use memory::MemoryStore;
