//! The basic types of the directory information tree.
//!
//! This module provides the fundamental types for naming and locating
//! entries: distinguished names and their components in [`name`], the
//! character-level reader the name decoders are built on in [`scan`],
//! and search scopes in [`scope`]. The most commonly used types are
//! re-exported here.

pub use self::name::{Ava, Dn, DnCache, Rdn};
pub use self::scan::SubstringReader;
pub use self::scope::SearchScope;

pub mod name;
pub mod scan;
pub mod scope;
