//! Distinguished names.
//!
//! This is a private module. Its public types are re-exported by the
//! parent.

use super::cache::DnCache;
use super::rdn::Rdn;
use crate::base::scan::SubstringReader;
use crate::base::scope::SearchScope;
use crate::schema::{Schema, UnknownAttributeType};
use core::cmp::Ordering;
use core::{fmt, hash};
use smallvec::SmallVec;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

//------------ Dn ------------------------------------------------------------

/// A distinguished name: the full hierarchical name of a directory entry.
///
/// A DN is an immutable chain of [`Rdn`]s from the leaf back to the root.
/// The chain nodes are shared: the parent of a DN is itself a DN, cloning
/// is reference counting, and a given ancestor decoded once can be the
/// literal parent of any number of names. The root DN is the empty chain
/// with size zero and no RDN.
///
/// Two DNs are equal iff they have the same size and pairwise equal RDNs
/// from leaf to root; the surface string they were decoded from does not
/// matter. The `Ord` impl sorts ancestors before their descendants, which
/// keeps a subtree contiguous in name-keyed sorted collections.
///
/// DNs carry no mutable state other than a lazily computed string memo,
/// so they can be shared freely across threads.
#[derive(Clone, Default)]
pub struct Dn {
    /// The leaf node of the chain, or `None` for the root DN.
    node: Option<Arc<DnNode>>,
}

/// One node in a DN chain.
struct DnNode {
    /// The DN this node extends.
    parent: Dn,

    /// The RDN this node adds.
    rdn: Rdn,

    /// The number of RDNs from the root, including this one.
    size: usize,

    /// The memoized string form.
    ///
    /// Decoding pre-seeds this with the original substring so that
    /// insignificant formatting survives a round trip; otherwise it is
    /// computed on first use. Computing it is idempotent, so concurrent
    /// first uses are harmless.
    string: OnceLock<Box<str>>,
}

/// # Creating Values
///
impl Dn {
    /// Returns the root DN.
    ///
    /// The root DN contains no RDNs and is superior to all other DNs. It
    /// is trivially cheap to construct.
    #[must_use]
    pub fn root() -> Dn {
        Dn { node: None }
    }

    /// Parses the string representation of a DN.
    ///
    /// The string is the comma-separated, `+`-joined-multivalue
    /// `attr=value` form of RFC 4514, e.g.
    /// `uid=bob,ou=people,dc=example,dc=com`. The empty string is the
    /// root DN. Attribute types are resolved against `schema` and every
    /// value is normalized via its type's equality matching rule.
    pub fn parse(s: &str, schema: &Schema) -> Result<Dn, DnParseError> {
        let mut reader = SubstringReader::new(s);
        Self::decode(&mut reader, schema, None)
    }

    /// Parses the string representation of a DN using a parse cache.
    ///
    /// Identical to [`parse`][Self::parse] except that the ancestor
    /// names encountered after each comma are looked up in and inserted
    /// into `cache`. The full string itself is never cached; leaf names
    /// are rarely repeated and would dilute the cache.
    pub fn parse_with_cache(
        s: &str,
        schema: &Schema,
        cache: &mut DnCache,
    ) -> Result<Dn, DnParseError> {
        let mut reader = SubstringReader::new(s);
        Self::decode(&mut reader, schema, Some(cache))
    }

    /// Decodes one RDN and recurses on the remainder.
    fn decode(
        reader: &mut SubstringReader,
        schema: &Schema,
        mut cache: Option<&mut DnCache>,
    ) -> Result<Dn, DnParseError> {
        reader.skip_whitespace();
        if reader.remaining() == 0 {
            return Ok(Dn::root());
        }

        let start = reader.pos();
        let rdn = Rdn::decode(reader, schema)?;
        let string = &reader.source()[start..];

        let parent = match reader.read() {
            Ok(',') => {
                reader.mark();
                let parent_str = reader.read_remaining();
                if parent_str.bytes().all(|ch| ch == b' ') {
                    return Err(InvalidNameSyntax::new(
                        SyntaxViolation::TrailingSeparator,
                        reader.source(),
                    )
                    .into());
                }
                match cache.as_deref_mut() {
                    Some(cache) => {
                        match cache.get(schema, parent_str) {
                            Some(parent) => parent,
                            None => {
                                reader.reset();
                                let parent = Self::decode(
                                    reader,
                                    schema,
                                    Some(&mut *cache),
                                )?;
                                cache.insert(parent_str, parent.clone());
                                parent
                            }
                        }
                    }
                    None => {
                        reader.reset();
                        Self::decode(reader, schema, None)?
                    }
                }
            }
            Ok(_) => {
                return Err(InvalidNameSyntax::new(
                    SyntaxViolation::UnexpectedCharacters,
                    reader.source(),
                )
                .into())
            }
            Err(_) => Dn::root(),
        };

        Ok(Self::with_node(parent, rdn, Some(string)))
    }

    /// Creates a DN extending `parent` by `rdn`.
    fn with_node(parent: Dn, rdn: Rdn, string: Option<&str>) -> Dn {
        let size = parent.size() + 1;
        let memo = OnceLock::new();
        if let Some(string) = string {
            let _ = memo.set(Box::from(string));
        }
        Dn {
            node: Some(Arc::new(DnNode {
                parent,
                rdn,
                size,
                string: memo,
            })),
        }
    }
}

/// # Properties
///
impl Dn {
    /// Returns whether this DN is the root DN.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the number of RDNs in this DN.
    #[must_use]
    pub fn size(&self) -> usize {
        match self.node {
            Some(ref node) => node.size,
            None => 0,
        }
    }

    /// Returns the leaf RDN of this DN, or `None` for the root DN.
    #[must_use]
    pub fn rdn(&self) -> Option<&Rdn> {
        self.node.as_ref().map(|node| &node.rdn)
    }

    /// Returns an iterator over the RDNs from the leaf to the root.
    #[must_use]
    pub fn iter(&self) -> RdnIter<'_> {
        RdnIter {
            node: self.node.as_deref(),
        }
    }
}

/// # Ancestry
///
impl Dn {
    /// Returns the immediate parent, or `None` for the root DN.
    #[must_use]
    pub fn parent(&self) -> Option<Dn> {
        self.node.as_ref().map(|node| node.parent.clone())
    }

    /// Returns the DN with the leaf-most `n` RDNs removed.
    ///
    /// For `n == 0` this is the DN itself. Asking for the parent of the
    /// root is not an error but an absence: once the walk steps past the
    /// root, `None` is returned.
    #[must_use]
    pub fn parent_n(&self, n: usize) -> Option<Dn> {
        let mut dn = self.clone();
        for _ in 0..n {
            dn = dn.parent()?;
        }
        Some(dn)
    }

    /// Returns the DN consisting of the leaf-most `n` RDNs only.
    ///
    /// For `n == 0` this is the root DN, for `n >= size` the DN itself.
    /// The returned chain is built bottom-up from fresh nodes rooted at
    /// the root DN.
    #[must_use]
    pub fn local_name(&self, n: usize) -> Dn {
        if n == 0 {
            return Dn::root();
        }
        if n >= self.size() {
            return self.clone();
        }
        let rdns: SmallVec<[&Rdn; 8]> = self.iter().take(n).collect();
        let mut dn = Dn::root();
        for rdn in rdns.iter().rev() {
            dn = dn.child((*rdn).clone());
        }
        dn
    }

    /// Returns the DN extending this DN by one RDN.
    ///
    /// The child DN whose RDN is [`Rdn::max_value`] compares greater
    /// than all other children of this DN and can serve as an exclusive
    /// upper bound for range queries over name-keyed sorted collections.
    #[must_use]
    pub fn child(&self, rdn: Rdn) -> Dn {
        Self::with_node(self.clone(), rdn, None)
    }

    /// Returns the DN extending this DN by all RDNs of `dn`.
    ///
    /// The root DN is the identity element: appending the root returns
    /// this DN unchanged, and appending to the root returns `dn`.
    #[must_use]
    pub fn child_dn(&self, dn: &Dn) -> Dn {
        if dn.is_root() {
            return self.clone();
        }
        if self.is_root() {
            return dn.clone();
        }
        let rdns: SmallVec<[&Rdn; 8]> = dn.iter().collect();
        let mut res = self.clone();
        for rdn in rdns.iter().rev() {
            res = res.child((*rdn).clone());
        }
        res
    }

    /// Returns whether this DN is an immediate child of `dn`.
    #[must_use]
    pub fn is_child_of(&self, dn: &Dn) -> bool {
        match self.node {
            Some(ref node) => node.parent == *dn,
            None => false,
        }
    }

    /// Returns whether this DN is the immediate parent of `dn`.
    #[must_use]
    pub fn is_parent_of(&self, dn: &Dn) -> bool {
        dn.is_child_of(self)
    }

    /// Returns whether this DN is subordinate to or equal to `dn`.
    ///
    /// A DN cannot be subordinate to a longer DN, so sizes are compared
    /// before any pointers are walked.
    #[must_use]
    pub fn is_subordinate_or_equal_to(&self, dn: &Dn) -> bool {
        if self.size() < dn.size() {
            return false;
        }
        match self.parent_n(self.size() - dn.size()) {
            Some(ancestor) => ancestor == *dn,
            None => false,
        }
    }

    /// Returns whether this DN is superior to or equal to `dn`.
    #[must_use]
    pub fn is_superior_or_equal_to(&self, dn: &Dn) -> bool {
        dn.is_subordinate_or_equal_to(self)
    }

    /// Returns whether this DN matches `base` under the given scope.
    ///
    /// A scope value that is not one of the four assigned constants
    /// matches nothing.
    #[must_use]
    pub fn is_in_scope_of(&self, base: &Dn, scope: SearchScope) -> bool {
        match scope {
            SearchScope::BASE_OBJECT => self == base,
            SearchScope::SINGLE_LEVEL => self.is_child_of(base),
            SearchScope::SUBORDINATES => {
                self.is_subordinate_or_equal_to(base) && self != base
            }
            SearchScope::WHOLE_SUBTREE => {
                self.is_subordinate_or_equal_to(base)
            }
            _ => false,
        }
    }

    /// Returns this DN with its ancestor `from` renamed to `to`.
    ///
    /// If this DN is not subordinate to or equal to `from`, it is
    /// returned unchanged. If it equals `from`, the result is `to`.
    /// Otherwise the result is `to` extended by this DN's local name
    /// relative to `from`, preserving RDN order. This is the primitive
    /// behind subtree rename.
    #[must_use]
    pub fn rename(&self, from: &Dn, to: &Dn) -> Dn {
        if !self.is_subordinate_or_equal_to(from) {
            self.clone()
        } else if self == from {
            to.clone()
        } else {
            to.child_dn(&self.local_name(self.size() - from.size()))
        }
    }
}

//--- PartialEq and Eq

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        if self.size() != other.size() {
            return false;
        }
        let mut left = self.node.as_deref();
        let mut right = other.node.as_deref();
        while let (Some(l), Some(r)) = (left, right) {
            if core::ptr::eq(l, r) {
                return true;
            }
            if l.rdn != r.rdn {
                return false;
            }
            left = l.parent.node.as_deref();
            right = r.parent.node.as_deref();
        }
        true
    }
}

impl Eq for Dn {}

//--- PartialOrd and Ord

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dn {
    /// Ancestor-first total order: the root sorts before any descendant
    /// and corresponding ancestors are compared from the root down; at
    /// an equal RDN prefix the shorter DN sorts first.
    fn cmp(&self, other: &Self) -> Ordering {
        let left: SmallVec<[&Rdn; 8]> = self.iter().collect();
        let right: SmallVec<[&Rdn; 8]> = other.iter().collect();
        for (l, r) in left.iter().rev().zip(right.iter().rev()) {
            match l.cmp(r) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        self.size().cmp(&other.size())
    }
}

//--- Hash

impl hash::Hash for Dn {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.size().hash(state);
        for rdn in self.iter() {
            rdn.hash(state);
        }
    }
}

//--- FromStr

impl FromStr for Dn {
    type Err = DnParseError;

    /// Parses a DN using the process default schema.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dn::parse(s, &Schema::default_schema())
    }
}

//--- IntoIterator

impl<'a> IntoIterator for &'a Dn {
    type Item = &'a Rdn;
    type IntoIter = RdnIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//--- Display and Debug

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.node {
            Some(ref node) => f.write_str(node.string()),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Dn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dn({})", self)
    }
}

impl DnNode {
    /// Returns the memoized string form, computing it if necessary.
    fn string(&self) -> &str {
        self.string.get_or_init(|| {
            let mut out = self.rdn.to_string();
            if !self.parent.is_root() {
                out.push(',');
                match self.parent.node {
                    Some(ref parent) => out.push_str(parent.string()),
                    None => unreachable!(),
                }
            }
            out.into_boxed_str()
        })
    }
}

//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Dn {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer
            .serialize_newtype_struct("Dn", &format_args!("{}", self))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Dn {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        struct InnerVisitor;

        impl serde::de::Visitor<'_> for InnerVisitor {
            type Value = Dn;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a distinguished name")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                v: &str,
            ) -> Result<Self::Value, E> {
                Dn::from_str(v).map_err(E::custom)
            }
        }

        struct NewtypeVisitor;

        impl<'de> serde::de::Visitor<'de> for NewtypeVisitor {
            type Value = Dn;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a distinguished name")
            }

            fn visit_newtype_struct<D: serde::Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> Result<Self::Value, D::Error> {
                deserializer.deserialize_str(InnerVisitor)
            }
        }

        deserializer.deserialize_newtype_struct("Dn", NewtypeVisitor)
    }
}

//------------ RdnIter -------------------------------------------------------

/// An iterator over the RDNs of a DN, from the leaf to the root.
#[derive(Clone, Debug)]
pub struct RdnIter<'a> {
    node: Option<&'a DnNode>,
}

impl<'a> Iterator for RdnIter<'a> {
    type Item = &'a Rdn;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.parent.node.as_deref();
        Some(&node.rdn)
    }
}

impl fmt::Debug for DnNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DnNode({})", self.string())
    }
}

//============ Error Types ===================================================

//------------ DnParseError --------------------------------------------------

/// An error happened while decoding a DN from its string form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DnParseError {
    /// The string is not a valid DN representation.
    InvalidNameSyntax(InvalidNameSyntax),

    /// An RDN references an attribute type the schema does not define.
    UnknownAttributeType(UnknownAttributeType),
}

//--- From

impl From<InvalidNameSyntax> for DnParseError {
    fn from(err: InvalidNameSyntax) -> Self {
        DnParseError::InvalidNameSyntax(err)
    }
}

impl From<UnknownAttributeType> for DnParseError {
    fn from(err: UnknownAttributeType) -> Self {
        DnParseError::UnknownAttributeType(err)
    }
}

//--- Display and Error

impl fmt::Display for DnParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DnParseError::InvalidNameSyntax(ref err) => {
                fmt::Display::fmt(err, f)
            }
            DnParseError::UnknownAttributeType(ref err) => {
                fmt::Display::fmt(err, f)
            }
        }
    }
}

impl std::error::Error for DnParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            DnParseError::InvalidNameSyntax(ref err) => Some(err),
            DnParseError::UnknownAttributeType(ref err) => Some(err),
        }
    }
}

//------------ InvalidNameSyntax ---------------------------------------------

/// A string is not a valid DN or RDN representation.
///
/// The error carries the way in which the string is malformed and the
/// offending substring. Malformed names are always surfaced, never
/// silently repaired; accepting them would risk unreachable or duplicate
/// directory entries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidNameSyntax {
    /// How the string is malformed.
    kind: SyntaxViolation,

    /// The offending substring.
    text: Box<str>,
}

impl InvalidNameSyntax {
    /// Creates a new error for the given violation and substring.
    pub(super) fn new(kind: SyntaxViolation, text: &str) -> Self {
        InvalidNameSyntax {
            kind,
            text: text.into(),
        }
    }

    /// Returns the way in which the string is malformed.
    #[must_use]
    pub fn kind(&self) -> SyntaxViolation {
        self.kind
    }

    /// Returns the offending substring.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

//--- Display and Error

impl fmt::Display for InvalidNameSyntax {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid name '{}': {}", self.text, self.kind)
    }
}

impl std::error::Error for InvalidNameSyntax {}

//------------ SyntaxViolation -----------------------------------------------

/// The ways in which a DN string can be malformed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SyntaxViolation {
    /// An attribute type name is missing or empty.
    EmptyAttributeName,

    /// The `=` between attribute type and value is missing.
    MissingEquals,

    /// A quoted value is missing its closing quote.
    UnbalancedQuotes,

    /// The name ends in a separator with nothing after it.
    TrailingSeparator,

    /// An escape sequence is incomplete.
    BadEscape,

    /// A `#`-prefixed value is not a sequence of hex digit pairs.
    BadHexString,

    /// Escaped bytes do not form valid UTF-8.
    InvalidUtf8,

    /// Characters were left over after a complete name.
    UnexpectedCharacters,

    /// The string ended in the middle of a name component.
    UnexpectedEnd,
}

//--- Display

impl fmt::Display for SyntaxViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SyntaxViolation::EmptyAttributeName => {
                f.write_str("empty attribute type name")
            }
            SyntaxViolation::MissingEquals => {
                f.write_str("expected '=' after attribute type")
            }
            SyntaxViolation::UnbalancedQuotes => {
                f.write_str("unbalanced quotes")
            }
            SyntaxViolation::TrailingSeparator => {
                f.write_str("trailing name separator")
            }
            SyntaxViolation::BadEscape => {
                f.write_str("incomplete escape sequence")
            }
            SyntaxViolation::BadHexString => {
                f.write_str("invalid hex value")
            }
            SyntaxViolation::InvalidUtf8 => {
                f.write_str("escaped bytes are not valid UTF-8")
            }
            SyntaxViolation::UnexpectedCharacters => {
                f.write_str("unexpected characters after name")
            }
            SyntaxViolation::UnexpectedEnd => {
                f.write_str("unexpected end of input")
            }
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::Ava;

    fn schema() -> Schema {
        Schema::core()
    }

    fn dn(s: &str) -> Dn {
        Dn::parse(s, &schema()).unwrap()
    }

    #[test]
    fn root_dn() {
        assert!(Dn::root().is_root());
        assert_eq!(Dn::root().size(), 0);
        assert_eq!(Dn::root().rdn(), None);
        assert_eq!(dn(""), Dn::root());
        assert_eq!(dn("   "), Dn::root());
        assert_eq!(Dn::root().to_string(), "");
    }

    #[test]
    fn parse_and_size() {
        let bob = dn("uid=bob,ou=people,dc=example,dc=com");
        assert_eq!(bob.size(), 4);
        assert_eq!(
            bob.parent().unwrap(),
            dn("ou=people,dc=example,dc=com")
        );
        assert_eq!(bob.rdn().unwrap().to_string(), "uid=bob");
    }

    #[test]
    fn equality_ignores_surface_form() {
        assert_eq!(dn("uid=Bob"), dn("UID=bob"));
        assert_ne!(dn("uid=Bob").to_string(), dn("UID=bob").to_string());
        assert_eq!(
            dn("uid=bob, ou=people , dc=example,dc=com"),
            dn("uid=bob,ou=people,dc=example,dc=com")
        );
        assert_ne!(dn("uid=bob"), dn("uid=alice"));
        assert_ne!(dn("uid=bob"), dn("uid=bob,dc=com"));
    }

    #[test]
    fn display_retains_original_form() {
        let s = "uid=bob, ou=people ,dc=example,dc=com";
        assert_eq!(dn(s).to_string(), s);

        // Composed DNs render canonically.
        let schema = schema();
        let uid = schema.attribute_type("uid").unwrap();
        let dc = schema.attribute_type("dc").unwrap();
        let composed = Dn::root()
            .child(Rdn::new(Ava::new(dc, "com")))
            .child(Rdn::new(Ava::new(uid, "bob")));
        assert_eq!(composed.to_string(), "uid=bob,dc=com");
    }

    #[test]
    fn round_trip() {
        for s in [
            "uid=bob,ou=people,dc=example,dc=com",
            "cn=John Smith+sn=Smith,o=ACME",
            "uid=Bob, ou=People, dc=example, dc=com",
            "cn=a\\,b,dc=com",
            "",
        ] {
            let first = dn(s);
            let second = dn(&first.to_string());
            assert_eq!(first, second, "round trip of '{}'", s);
        }
    }

    #[test]
    fn ancestors_are_shared() {
        let bob = dn("uid=bob,ou=people,dc=example,dc=com");
        let parent = bob.parent().unwrap();
        assert_eq!(parent.to_string(), "ou=people,dc=example,dc=com");
        assert_eq!(
            parent.parent().unwrap().to_string(),
            "dc=example,dc=com"
        );
    }

    #[test]
    fn child_and_parent_inverse() {
        let schema = schema();
        let ou = schema.attribute_type("ou").unwrap();
        let people = Rdn::new(Ava::new(ou, "people"));

        for base in [Dn::root(), dn("dc=example,dc=com")] {
            let child = base.child(people.clone());
            assert_eq!(child.parent().unwrap(), base);
            assert!(child.is_child_of(&base));
            assert!(base.is_parent_of(&child));
        }
    }

    #[test]
    fn child_dn_identities() {
        let base = dn("dc=example,dc=com");
        let sub = dn("uid=bob,ou=people");

        assert_eq!(base.child_dn(&Dn::root()), base);
        assert_eq!(Dn::root().child_dn(&base), base);
        assert_eq!(
            base.child_dn(&sub),
            dn("uid=bob,ou=people,dc=example,dc=com")
        );
    }

    #[test]
    fn parent_n() {
        let bob = dn("uid=bob,ou=people,dc=example,dc=com");
        assert_eq!(bob.parent_n(0).unwrap(), bob);
        assert_eq!(bob.parent_n(2).unwrap(), dn("dc=example,dc=com"));
        assert_eq!(bob.parent_n(4).unwrap(), Dn::root());
        assert_eq!(bob.parent_n(5), None);
        assert_eq!(Dn::root().parent(), None);
    }

    #[test]
    fn local_name() {
        let bob = dn("uid=bob,ou=people,dc=example,dc=com");
        assert_eq!(bob.local_name(0), Dn::root());
        assert_eq!(bob.local_name(2), dn("uid=bob,ou=people"));
        assert_eq!(bob.local_name(4), bob);
        assert_eq!(bob.local_name(17), bob);
    }

    #[test]
    fn subordinate_and_superior() {
        let com = dn("dc=com");
        let example = dn("dc=example,dc=com");
        let bob = dn("uid=bob,ou=people,dc=example,dc=com");

        assert!(bob.is_subordinate_or_equal_to(&bob));
        assert!(bob.is_subordinate_or_equal_to(&example));
        assert!(bob.is_subordinate_or_equal_to(&com));
        assert!(bob.is_subordinate_or_equal_to(&Dn::root()));
        assert!(!example.is_subordinate_or_equal_to(&bob));
        assert!(!example.is_subordinate_or_equal_to(&dn("dc=net")));

        assert!(com.is_superior_or_equal_to(&bob));
        assert!(Dn::root().is_superior_or_equal_to(&bob));
        assert!(!bob.is_superior_or_equal_to(&example));
    }

    #[test]
    fn ancestry_is_transitive() {
        let a = dn("uid=bob,ou=people,dc=example,dc=com");
        let b = dn("ou=people,dc=example,dc=com");
        let c = dn("dc=com");
        assert!(a.is_subordinate_or_equal_to(&b));
        assert!(b.is_subordinate_or_equal_to(&c));
        assert!(a.is_subordinate_or_equal_to(&c));
    }

    #[test]
    fn scope() {
        let example = dn("dc=example,dc=com");
        let com = dn("dc=com");

        assert!(example.is_in_scope_of(&com, SearchScope::SINGLE_LEVEL));
        assert!(example.is_in_scope_of(&com, SearchScope::WHOLE_SUBTREE));
        assert!(!example.is_in_scope_of(&com, SearchScope::BASE_OBJECT));
        assert!(example.is_in_scope_of(&com, SearchScope::SUBORDINATES));

        assert!(com.is_in_scope_of(&com, SearchScope::BASE_OBJECT));
        assert!(com.is_in_scope_of(&com, SearchScope::WHOLE_SUBTREE));
        assert!(!com.is_in_scope_of(&com, SearchScope::SINGLE_LEVEL));
        assert!(!com.is_in_scope_of(&com, SearchScope::SUBORDINATES));

        let bob = dn("uid=bob,ou=people,dc=example,dc=com");
        assert!(!bob.is_in_scope_of(&com, SearchScope::SINGLE_LEVEL));
        assert!(bob.is_in_scope_of(&com, SearchScope::WHOLE_SUBTREE));

        // Unrecognized scopes never match.
        assert!(!com.is_in_scope_of(&com, SearchScope::from_int(77)));
    }

    #[test]
    fn rename() {
        let bob = dn("uid=bob,dc=old");
        assert_eq!(
            bob.rename(&dn("dc=old"), &dn("dc=new")),
            dn("uid=bob,dc=new")
        );
        assert_eq!(dn("dc=old").rename(&dn("dc=old"), &dn("dc=new")), dn("dc=new"));
        assert_eq!(bob.rename(&dn("dc=other"), &dn("dc=new")), bob);

        let deep = dn("cn=x,ou=a,ou=b,dc=example,dc=com");
        assert_eq!(
            deep.rename(&dn("dc=example,dc=com"), &dn("dc=example,dc=org")),
            dn("cn=x,ou=a,ou=b,dc=example,dc=org")
        );
    }

    #[test]
    fn ordering_is_ancestor_first() {
        let mut names = vec![
            dn("uid=bob,ou=people,dc=example,dc=com"),
            dn("dc=com"),
            Dn::root(),
            dn("ou=people,dc=example,dc=com"),
            dn("dc=example,dc=com"),
            dn("ou=groups,dc=example,dc=com"),
        ];
        names.sort();
        let sorted: Vec<String> =
            names.iter().map(ToString::to_string).collect();
        assert_eq!(
            sorted,
            [
                "",
                "dc=com",
                "dc=example,dc=com",
                "ou=groups,dc=example,dc=com",
                "ou=people,dc=example,dc=com",
                "uid=bob,ou=people,dc=example,dc=com",
            ]
        );
    }

    #[test]
    fn ordering_consistent_with_equality() {
        let names = [
            Dn::root(),
            dn("dc=com"),
            dn("DC=Com"),
            dn("dc=example,dc=com"),
            dn("uid=bob,dc=example,dc=com"),
        ];
        for left in &names {
            for right in &names {
                let ord = left.cmp(right);
                assert_eq!(ord == Ordering::Equal, left == right);
                assert_eq!(right.cmp(left), ord.reverse());
            }
        }
    }

    #[test]
    fn max_value_bounds_children() {
        let base = dn("ou=people,dc=example,dc=com");
        let upper = base.child(Rdn::max_value());
        assert!(dn("uid=bob,ou=people,dc=example,dc=com") < upper);
        assert!(dn("uid=zzz,ou=people,dc=example,dc=com") < upper);
        assert!(base < upper);
    }

    #[test]
    fn hash_consistent_with_equality() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut s1 = DefaultHasher::new();
        let mut s2 = DefaultHasher::new();
        dn("uid=Bob, ou=People,dc=example,dc=com").hash(&mut s1);
        dn("uid=bob,ou=people,dc=example,dc=com").hash(&mut s2);
        assert_eq!(s1.finish(), s2.finish());
    }

    #[test]
    fn escaped_values() {
        let dn1 = dn("cn=Smith\\, John,dc=com");
        assert_eq!(dn1.size(), 2);
        assert_eq!(
            dn1.rdn().unwrap().avas()[0].value(),
            "Smith, John"
        );

        let dn2 = dn("cn=\\23hash,dc=com");
        assert_eq!(dn2.rdn().unwrap().avas()[0].value(), "#hash");

        // Hex pair escapes contribute raw bytes.
        let dn3 = dn("cn=J\\C3\\BCrgen,dc=com");
        assert_eq!(dn3.rdn().unwrap().avas()[0].value(), "Jürgen");
    }

    #[test]
    fn quoted_values() {
        let dn1 = dn("cn=\"Smith, John\",dc=com");
        assert_eq!(dn1.rdn().unwrap().avas()[0].value(), "Smith, John");

        match Dn::parse("cn=\"unterminated,dc=com", &schema()) {
            Err(DnParseError::InvalidNameSyntax(err)) => {
                assert_eq!(err.kind(), SyntaxViolation::UnbalancedQuotes);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn hex_values() {
        // "#" followed by the hex encoding of "foo".
        let dn1 = dn("cn=#666F6F,dc=com");
        assert_eq!(dn1.rdn().unwrap().avas()[0].value(), "foo");

        match Dn::parse("cn=#66F,dc=com", &schema()) {
            Err(DnParseError::InvalidNameSyntax(err)) => {
                assert_eq!(err.kind(), SyntaxViolation::BadHexString);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn syntax_errors() {
        for (input, kind) in [
            ("uid=bob,", SyntaxViolation::TrailingSeparator),
            ("uid=bob, ", SyntaxViolation::TrailingSeparator),
            ("=bob", SyntaxViolation::EmptyAttributeName),
            ("uid bob", SyntaxViolation::MissingEquals),
            ("uid", SyntaxViolation::MissingEquals),
            ("cn=\"a\" x", SyntaxViolation::UnexpectedCharacters),
            ("cn=a\\", SyntaxViolation::BadEscape),
        ] {
            match Dn::parse(input, &schema()) {
                Err(DnParseError::InvalidNameSyntax(err)) => {
                    assert_eq!(err.kind(), kind, "input '{}'", input);
                }
                other => {
                    panic!("'{}' produced {:?}", input, other)
                }
            }
        }
    }

    #[test]
    fn unknown_attribute_type() {
        let schema = schema();
        match Dn::parse("frobnicator=1,dc=com", &schema) {
            Err(DnParseError::UnknownAttributeType(err)) => {
                assert_eq!(err.name(), "frobnicator");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // Permissive decoding keeps the value opaque and unnormalized.
        let permissive = schema.as_permissive();
        let dn = Dn::parse("frobnicator=MiXeD,dc=com", &permissive).unwrap();
        let ava = &dn.rdn().unwrap().avas()[0];
        assert!(ava.attribute_type().is_placeholder());
        assert_eq!(ava.normalized_value(), "MiXeD");
    }

    #[test]
    fn multi_valued_rdn() {
        let dn1 = dn("cn=John Smith+sn=Smith,o=ACME");
        assert_eq!(dn1.size(), 2);
        assert_eq!(dn1.rdn().unwrap().avas().len(), 2);

        // AVA presentation order does not affect equality.
        assert_eq!(dn1, dn("sn=Smith+cn=John Smith,o=ACME"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ser_de() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &dn("uid=bob,dc=example,dc=com"),
            &[
                Token::NewtypeStruct { name: "Dn" },
                Token::Str("uid=bob,dc=example,dc=com"),
            ],
        );
    }
}
