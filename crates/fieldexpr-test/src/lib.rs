//! Shared test fixtures for fieldexpr crates.
//!
//! This crate provides a small reference expression language and sample
//! records for testing the registry end to end.
//!
//! - [`lang`] - Expression language implementing `ExpressionCompiler`
//! - [`records`] - Derived record types covering every field kind
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! fieldexpr-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use fieldexpr_test::lang::LangCompiler;
//! use fieldexpr_test::records::User;
//! ```

pub mod lang;
pub mod records;

// Re-export commonly used types at crate root for convenience
pub use lang::{LangCompiler, LangError};
pub use records::{Address, Handle, Tree, User};

use fieldexpr::{Registry, RegistryConfig};

/// A registry backed by [`LangCompiler`] with the default configuration.
pub fn registry() -> Registry {
    Registry::new(LangCompiler::new())
}

/// A registry backed by [`LangCompiler`] with `config`.
pub fn registry_with(config: RegistryConfig) -> Registry {
    Registry::with_config(config, LangCompiler::new())
}
