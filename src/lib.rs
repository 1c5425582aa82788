//! cinedeck — session and movie-catalog state stores over Firebase.
//!
//! ARCHITECTURE
//! ============
//! `state` holds the two reactive stores the UI layer reads and drives.
//! `net` defines the backend traits they depend on plus the REST clients that
//! implement them. `config` turns environment variables into client settings.

pub mod config;
pub mod net;
pub mod state;

pub use net::types::{
    AuthError, Document, DocumentStore, FederatedProvider, IdentityClient, Query, SortDirection, StoreError, User,
    UserCredential,
};
pub use state::catalog::{CatalogState, CatalogStore, Movie};
pub use state::session::{SessionState, SessionStore};
