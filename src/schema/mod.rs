//! Schema elements.
//!
//! The directory schema maps attribute-type identifiers to the matching
//! rules that govern how their values compare. This module provides the
//! lookup contract consumed by the name types: [`AttributeType`] handles,
//! the [`Schema`] registry with strict and permissive lookup, a
//! [`SchemaBuilder`], the built-in [core schema][Schema::core], and a
//! replaceable process-wide [default schema][Schema::default_schema].
//!
//! How schemas are populated from or persisted to a directory is not
//! defined here; a schema is assembled through the builder and consumed
//! read-only afterwards.

pub use self::matching::{
    MatchOperation, MatchingRule, UnsupportedMatchingOperation,
};

pub mod matching;

use arc_swap::ArcSwapOption;
use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

//------------ AttributeType -------------------------------------------------

/// An attribute type as declared by a schema.
///
/// Attribute types are immutable and cheap to clone; every AVA of every
/// RDN holds one. Equality, ordering, and hashing use the type's
/// [identifier][Self::identifier], so handles obtained from different
/// lookups of the same type compare equal.
#[derive(Clone, Debug)]
pub struct AttributeType {
    inner: Arc<AttrTypeInner>,
}

/// The shared payload of an [`AttributeType`].
#[derive(Debug)]
struct AttrTypeInner {
    /// The object identifier of the type.
    oid: Box<str>,

    /// The names of the type, primary name first.
    names: Vec<Box<str>>,

    /// The lowercased primary name, or the OID for nameless types.
    identifier: Box<str>,

    /// The equality matching rule.
    equality: MatchingRule,

    /// The ordering matching rule, if the type declares one.
    ordering: Option<MatchingRule>,

    /// The substring matching rule, if the type declares one.
    substring: Option<MatchingRule>,

    /// Whether this is a stand-in for a type absent from the schema.
    placeholder: bool,
}

impl AttributeType {
    /// Creates a new attribute type.
    fn new(
        oid: &str,
        names: &[&str],
        equality: MatchingRule,
        ordering: Option<MatchingRule>,
        substring: Option<MatchingRule>,
    ) -> Self {
        let identifier = match names.first() {
            Some(name) => name.to_ascii_lowercase(),
            None => oid.to_ascii_lowercase(),
        };
        AttributeType {
            inner: Arc::new(AttrTypeInner {
                oid: oid.into(),
                names: names.iter().map(|name| Box::from(*name)).collect(),
                identifier: identifier.into(),
                equality,
                ordering,
                substring,
                placeholder: false,
            }),
        }
    }

    /// Creates a stand-in for a type the schema does not define.
    ///
    /// The raw name serves as the identifier and all matching is exact;
    /// values of such a type are kept unnormalized.
    fn placeholder(name: &str) -> Self {
        AttributeType {
            inner: Arc::new(AttrTypeInner {
                oid: Box::from(""),
                names: vec![Box::from(name)],
                identifier: name.to_ascii_lowercase().into(),
                equality: MatchingRule::OctetString,
                ordering: Some(MatchingRule::OctetString),
                substring: Some(MatchingRule::OctetString),
                placeholder: true,
            }),
        }
    }

    /// Returns the object identifier of the type.
    #[must_use]
    pub fn oid(&self) -> &str {
        &self.inner.oid
    }

    /// Returns the primary name of the type, or its OID if it has none.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.inner.names.first() {
            Some(name) => name,
            None => &self.inner.oid,
        }
    }

    /// Returns all names of the type, primary name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.names.iter().map(|name| &**name)
    }

    /// Returns the identifier used for comparing attribute types.
    ///
    /// This is the lowercased primary name, or the OID for a type
    /// without names.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    /// Returns the equality matching rule of the type.
    #[must_use]
    pub fn equality_rule(&self) -> MatchingRule {
        self.inner.equality
    }

    /// Returns the ordering matching rule of the type, if any.
    #[must_use]
    pub fn ordering_rule(&self) -> Option<MatchingRule> {
        self.inner.ordering
    }

    /// Returns the substring matching rule of the type, if any.
    #[must_use]
    pub fn substring_rule(&self) -> Option<MatchingRule> {
        self.inner.substring
    }

    /// Returns whether this type is a stand-in for an undefined type.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.inner.placeholder
    }
}

//--- PartialEq, Eq, PartialOrd, Ord, Hash

impl PartialEq for AttributeType {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for AttributeType {}

impl PartialOrd for AttributeType {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeType {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.identifier().cmp(other.identifier())
    }
}

impl core::hash::Hash for AttributeType {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.identifier().hash(state)
    }
}

//--- Display

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

//------------ Schema --------------------------------------------------------

/// A read-only registry of attribute types.
///
/// A schema is a shared handle; cloning it is reference counting. The
/// handle's identity — the shared registry plus the strictness of the
/// handle — scopes the DN parse cache: replacing a schema makes caches
/// bound to the old one unreachable.
///
/// A strict schema fails lookup of undefined attribute types. The
/// [permissive variant][Self::as_permissive] resolves them to an exact-
/// match placeholder instead, an explicit caller-opted degradation used
/// for names that must be accepted even when the schema is incomplete.
#[derive(Clone, Debug)]
pub struct Schema {
    inner: Arc<SchemaInner>,
    strict: bool,
}

/// The shared payload of a [`Schema`].
#[derive(Debug, Default)]
struct SchemaInner {
    /// All registered attribute types.
    types: Vec<AttributeType>,

    /// Index into `types` by lowercased name and by OID.
    by_name: HashMap<Box<str>, usize>,
}

/// The process-wide default schema, set on first use or explicitly.
static DEFAULT_SCHEMA: ArcSwapOption<SchemaInner> =
    ArcSwapOption::const_empty();

impl Schema {
    /// Returns a builder for assembling a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Returns the built-in core schema.
    ///
    /// The core schema contains the standard user attribute types wired
    /// to their usual matching rules. It is built once per process.
    #[must_use]
    pub fn core() -> Schema {
        static CORE: OnceLock<Schema> = OnceLock::new();
        CORE.get_or_init(build_core_schema).clone()
    }

    /// Returns the process-wide default schema.
    ///
    /// Unless a default has been installed with
    /// [`set_default_schema`][Self::set_default_schema], this is the
    /// [core schema][Self::core]. The returned handle is strict.
    #[must_use]
    pub fn default_schema() -> Schema {
        if let Some(inner) = DEFAULT_SCHEMA.load_full() {
            return Schema {
                inner,
                strict: true,
            };
        }
        let core = Schema::core();
        DEFAULT_SCHEMA.compare_and_swap(
            &None::<Arc<SchemaInner>>,
            Some(core.inner.clone()),
        );
        Schema {
            inner: DEFAULT_SCHEMA
                .load_full()
                .unwrap_or_else(|| core.inner.clone()),
            strict: true,
        }
    }

    /// Installs a new process-wide default schema.
    ///
    /// Callers holding older handles are unaffected; their caches expire
    /// the next time they are used with the new default.
    pub fn set_default_schema(schema: &Schema) {
        DEFAULT_SCHEMA.store(Some(schema.inner.clone()));
    }

    /// Looks up an attribute type by one of its names or its OID.
    ///
    /// The lookup is case-insensitive. A strict schema fails with
    /// [`UnknownAttributeType`] when the type is not defined; a
    /// permissive schema synthesizes an exact-match placeholder instead.
    pub fn attribute_type(
        &self,
        name: &str,
    ) -> Result<AttributeType, UnknownAttributeType> {
        let key = name.to_ascii_lowercase();
        if let Some(&idx) = self.inner.by_name.get(key.as_str()) {
            return Ok(self.inner.types[idx].clone());
        }
        if self.strict {
            Err(UnknownAttributeType { name: name.into() })
        } else {
            tracing::debug!(
                attribute_type = name,
                "undefined attribute type, treating value as opaque"
            );
            Ok(AttributeType::placeholder(name))
        }
    }

    /// Returns an iterator over all registered attribute types.
    pub fn attribute_types(&self) -> impl Iterator<Item = &AttributeType> {
        self.inner.types.iter()
    }

    /// Returns whether this handle fails lookup of undefined types.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns a permissive handle to the same registry.
    #[must_use]
    pub fn as_permissive(&self) -> Schema {
        Schema {
            inner: self.inner.clone(),
            strict: false,
        }
    }

    /// Returns a strict handle to the same registry.
    #[must_use]
    pub fn as_strict(&self) -> Schema {
        Schema {
            inner: self.inner.clone(),
            strict: true,
        }
    }

    /// Returns whether two handles have the same identity.
    ///
    /// Handles are the same if they share the registry and agree on
    /// strictness. This is the identity the DN parse cache is scoped by.
    #[must_use]
    pub fn same(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            && self.strict == other.strict
    }
}

//------------ SchemaBuilder -------------------------------------------------

/// A builder assembling a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    inner: SchemaInner,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers an attribute type.
    ///
    /// The type becomes resolvable under each of its names and under its
    /// OID, case-insensitively. Registering a name or OID again replaces
    /// the earlier definition for that key.
    pub fn attribute_type(
        &mut self,
        oid: &str,
        names: &[&str],
        equality: MatchingRule,
        ordering: Option<MatchingRule>,
        substring: Option<MatchingRule>,
    ) -> &mut Self {
        let at = AttributeType::new(oid, names, equality, ordering, substring);
        let idx = self.inner.types.len();
        self.inner
            .by_name
            .insert(oid.to_ascii_lowercase().into(), idx);
        for name in names {
            self.inner
                .by_name
                .insert(name.to_ascii_lowercase().into(), idx);
        }
        self.inner.types.push(at);
        self
    }

    /// Finishes building and returns a strict schema handle.
    #[must_use]
    pub fn finish(self) -> Schema {
        Schema {
            inner: Arc::new(self.inner),
            strict: true,
        }
    }
}

/// Builds the core schema.
fn build_core_schema() -> Schema {
    use self::MatchingRule::*;

    let mut builder = Schema::builder();
    let case_attrs: &[(&str, &[&str])] = &[
        ("2.5.4.0", &["objectClass"]),
        ("2.5.4.3", &["cn", "commonName"]),
        ("2.5.4.4", &["sn", "surname"]),
        ("2.5.4.6", &["c", "countryName"]),
        ("2.5.4.7", &["l", "localityName"]),
        ("2.5.4.8", &["st", "stateOrProvinceName"]),
        ("2.5.4.9", &["street", "streetAddress"]),
        ("2.5.4.10", &["o", "organizationName"]),
        ("2.5.4.11", &["ou", "organizationalUnitName"]),
        ("2.5.4.13", &["description"]),
        ("2.5.4.42", &["givenName"]),
        ("0.9.2342.19200300.100.1.1", &["uid", "userid"]),
        ("0.9.2342.19200300.100.1.3", &["mail", "rfc822Mailbox"]),
        ("0.9.2342.19200300.100.1.25", &["dc", "domainComponent"]),
    ];
    for &(oid, names) in case_attrs {
        builder.attribute_type(
            oid,
            names,
            CaseIgnore,
            Some(CaseIgnore),
            Some(CaseIgnore),
        );
    }
    builder.attribute_type(
        "2.5.4.20",
        &["telephoneNumber"],
        NumericString,
        None,
        Some(NumericString),
    );
    builder.attribute_type(
        "2.5.4.35",
        &["userPassword"],
        OctetString,
        Some(OctetString),
        Some(OctetString),
    );
    builder.attribute_type(
        "2.5.21.1",
        &["dITStructureRules"],
        IntegerFirstComponent,
        None,
        None,
    );
    builder.finish()
}

//============ Error Types ===================================================

//------------ UnknownAttributeType ------------------------------------------

/// An attribute type is not defined by the schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownAttributeType {
    /// The name or OID that failed to resolve.
    name: Box<str>,
}

impl UnknownAttributeType {
    /// Returns the name or OID that failed to resolve.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

//--- Display and Error

impl fmt::Display for UnknownAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown attribute type '{}'", self.name)
    }
}

impl std::error::Error for UnknownAttributeType {}

//============ Testing =======================================================
