//! Persona store implementations for personasmith.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FilePersonaStore;
pub use in_memory::InMemoryPersonaStore;
