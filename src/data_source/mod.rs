//! Backend implementations.
//!
//! This module provides concrete implementations of the domain-level
//! `RemoteDataSource` and `AuthProvider` traits. They are exposed only
//! through constructor functions and their own handle types.
//!
//! Screen code must not depend on backend-specific types.

mod memory;

pub use memory::create_auth_provider as create_memory_auth_provider;
pub use memory::create_data_source as create_memory_data_source;
pub use memory::{MemoryAuthProvider, MemoryDataSource};
