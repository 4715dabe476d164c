//! A library for the core types of an LDAP directory service.
//!
//! This crate implements the data model at the heart of a directory
//! server: hierarchical entry names and the schema machinery that gives
//! their values meaning.
//!
//! The two name types live in [`base::name`]: [`Dn`][base::name::Dn],
//! a distinguished name represented as a shared immutable chain of
//! [`Rdn`][base::name::Rdn]s, and the RDNs themselves, built from
//! attribute-value assertions whose values are normalized once at
//! construction. Decoding follows RFC 4514 and can be accelerated with
//! a [`DnCache`][base::name::DnCache] when many names share suffixes.
//!
//! Attribute types and their matching rules live in [`schema`]. A
//! [`Schema`][schema::Schema] resolves attribute names during decoding
//! and is either strict, rejecting unknown attribute types, or
//! permissive, synthesizing placeholder types for them. The
//! [`MatchingRule`][schema::MatchingRule] type provides the
//! normalization behind equality, ordering, and substring matching.
//!
//! # Optional Features
//!
//! * `serde`: support for serializing and deserializing DNs via their
//!   string representation.

pub mod base;
pub mod schema;
