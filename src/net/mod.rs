//! Backend collaborators.
//!
//! ARCHITECTURE
//! ============
//! `types` defines the identity and document traits the stores depend on.
//! `identity` and `firestore` are the REST implementations used in
//! production; tests substitute in-memory mocks.

pub mod firestore;
pub mod identity;
pub mod types;
