//! Todo subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → handlers.rs (extract path/body, log)
//!     → store.rs (span + metrics around each operation, mutex-guarded list)
//!     → model.rs (Todo / CreateTodo / UpdateTodo)
//!     → error.rs (NotFound → 404, Unknown → 500, fault marker)
//! ```

pub mod error;
pub mod handlers;
pub mod model;
pub mod store;

pub use error::TodoError;
pub use model::{CreateTodo, Todo, UpdateTodo};
pub use store::TodoStore;
