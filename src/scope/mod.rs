//! Hierarchical scope addressing module
//!
//! Provides the `ScopePath` value type: the immutable, normalized address
//! of every scope, resource, and permission entry in the engine.
//!
//! # Examples
//!
//! ```
//! use scopegate::scope::ScopePath;
//!
//! let scope = ScopePath::parse("/org/acme/dept");
//! assert_eq!(scope.rank(), 3);
//! assert!(ScopePath::parse("/org/acme") <= scope);
//! ```

mod path;

#[cfg(test)]
mod tests;

pub use path::ScopePath;
