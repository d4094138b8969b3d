//! # schetovod-store: Persistence Layer for Schetovod
//!
//! A synchronous repository over a string-keyed JSON snapshot store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Schetovod Data Flow                                │
//! │                                                                         │
//! │  Host command (save company, render invoice, …)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 schetovod-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐      ┌───────────────┐                     │   │
//! │  │   │     Store     │      │   KvBackend   │                     │   │
//! │  │   │  (store.rs)   │─────►│    (kv.rs)    │                     │   │
//! │  │   │               │      │               │                     │   │
//! │  │   │ collections   │      │ FileKv        │                     │   │
//! │  │   │ counters      │      │ MemoryKv      │                     │   │
//! │  │   │ observer list │      │               │                     │   │
//! │  │   └───────────────┘      └───────┬───────┘                     │   │
//! │  └──────────────────────────────────┼──────────────────────────────┘   │
//! │                                     ▼                                   │
//! │                        one JSON file, rewritten in                      │
//! │                        full on every mutation                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - the key-value backend trait and its file/memory backends
//! - [`store`] - the repository: collections, counters, change feed
//! - [`error`] - persistence error types
//!
//! ## Usage
//!
//! ```rust
//! use schetovod_store::{MemoryKv, Store};
//! use schetovod_core::types::DocKind;
//!
//! let mut store = Store::open(Box::new(MemoryKv::new()))?;
//! assert_eq!(store.next_number(DocKind::Invoice)?, "0001");
//! # Ok::<(), schetovod_store::StoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use kv::{FileKv, KvBackend, MemoryKv};
pub use store::{Change, Store, SubscriptionId};
