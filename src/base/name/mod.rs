//! Directory names.
//!
//! Every entry in a directory tree is identified by its *distinguished
//! name,* a sequence of *relative distinguished names* leading from the
//! entry up to the root of the tree. This module provides the two name
//! types, [`Dn`] and [`Rdn`], the attribute-value assertions RDNs are
//! built from, and a [`DnCache`] that speeds up decoding runs of names
//! sharing suffixes.

pub use self::cache::DnCache;
pub use self::dn::{
    Dn, DnParseError, InvalidNameSyntax, RdnIter, SyntaxViolation,
};
pub use self::rdn::{Ava, Rdn};

mod cache;
mod dn;
mod rdn;
