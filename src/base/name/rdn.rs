//! Relative distinguished names.
//!
//! This is a private module. Its public types are re-exported by the
//! parent.

use super::dn::{DnParseError, InvalidNameSyntax, SyntaxViolation};
use crate::base::scan::SubstringReader;
use crate::schema::{AttributeType, Schema};
use core::cmp::Ordering;
use core::{fmt, hash};
use smallvec::SmallVec;

//------------ Ava -----------------------------------------------------------

/// An attribute-value assertion: one attribute type with one value.
///
/// The value is normalized exactly once, at construction, via the
/// equality matching rule of its attribute type; both the raw and the
/// normalized form are kept. AVAs are immutable afterwards.
#[derive(Clone, Debug)]
pub struct Ava {
    /// The attribute type of the assertion.
    attribute_type: AttributeType,

    /// The value as presented.
    value: Box<str>,

    /// The value normalized for equality comparison.
    normalized: Box<str>,
}

impl Ava {
    /// Creates a new AVA, normalizing the value.
    ///
    /// Should the type's equality rule decline the value, the raw value
    /// doubles as the normalized form; matching-rule quirks must not
    /// keep a name from being constructed.
    pub fn new(
        attribute_type: AttributeType,
        value: impl Into<String>,
    ) -> Self {
        let value = value.into();
        let normalized = match attribute_type
            .equality_rule()
            .normalize_for_equality(&value)
        {
            Ok(normalized) => normalized.into_owned(),
            Err(_) => value.clone(),
        };
        Ava {
            attribute_type,
            value: value.into(),
            normalized: normalized.into(),
        }
    }

    /// Returns the attribute type of the AVA.
    #[must_use]
    pub fn attribute_type(&self) -> &AttributeType {
        &self.attribute_type
    }

    /// Returns the value as presented.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the value normalized via the type's equality rule.
    #[must_use]
    pub fn normalized_value(&self) -> &str {
        &self.normalized
    }

    /// Decodes one AVA off the reader.
    pub(super) fn decode(
        reader: &mut SubstringReader,
        schema: &Schema,
    ) -> Result<Ava, DnParseError> {
        reader.skip_whitespace();
        let name = decode_attribute_name(reader)?;
        reader.skip_whitespace();
        match reader.read() {
            Ok('=') => {}
            _ => {
                return Err(InvalidNameSyntax::new(
                    SyntaxViolation::MissingEquals,
                    reader.source(),
                )
                .into())
            }
        }
        reader.skip_whitespace();
        let value = decode_value(reader)?;
        let attribute_type = schema.attribute_type(name)?;
        Ok(Ava::new(attribute_type, value))
    }
}

//--- PartialEq, Eq, PartialOrd, Ord, Hash
//
// All four use the attribute type identifier and the normalized value;
// the presented value does not take part in comparisons.

impl PartialEq for Ava {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ava {}

impl PartialOrd for Ava {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ava {
    fn cmp(&self, other: &Self) -> Ordering {
        self.attribute_type
            .cmp(&other.attribute_type)
            .then_with(|| {
                self.normalized
                    .as_bytes()
                    .cmp(other.normalized.as_bytes())
            })
    }
}

impl hash::Hash for Ava {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.attribute_type.hash(state);
        self.normalized.hash(state);
    }
}

//--- Display

impl fmt::Display for Ava {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=", self.attribute_type.name())?;
        fmt_escaped_value(&self.value, f)
    }
}

//------------ Rdn -----------------------------------------------------------

/// A relative distinguished name: one naming component of a DN.
///
/// An RDN consists of one or more [`Ava`]s. RDNs are immutable and
/// cheap to clone; a single RDN can be part of any number of DNs and
/// shared freely across threads.
///
/// Comparison is by AVA count first, then pairwise over the AVA multiset
/// in sorted order, so the order in which a multi-valued RDN presents
/// its AVAs does not affect equality or ordering. The distinguished
/// [maximal sentinel][Self::max_value] compares greater than every real
/// RDN.
#[derive(Clone, Debug)]
pub struct Rdn {
    repr: Repr,
}

/// The representation of an RDN.
#[derive(Clone, Debug)]
enum Repr {
    /// A real RDN with its AVAs in presentation order.
    Avas(SmallVec<[Ava; 1]>),

    /// The maximal sentinel.
    Max,
}

impl Rdn {
    /// Creates an RDN with a single AVA.
    #[must_use]
    pub fn new(ava: Ava) -> Rdn {
        let mut avas = SmallVec::new();
        avas.push(ava);
        Rdn {
            repr: Repr::Avas(avas),
        }
    }

    /// Creates a multi-valued RDN from the given AVAs.
    ///
    /// Returns `None` if the iterator is empty; an RDN has at least one
    /// AVA.
    pub fn from_avas(
        avas: impl IntoIterator<Item = Ava>,
    ) -> Option<Rdn> {
        let avas: SmallVec<[Ava; 1]> = avas.into_iter().collect();
        if avas.is_empty() {
            None
        } else {
            Some(Rdn {
                repr: Repr::Avas(avas),
            })
        }
    }

    /// Returns the maximal sentinel RDN.
    ///
    /// The sentinel compares greater than every real RDN. Its only use
    /// is building an exclusive upper bound for range queries over
    /// name-keyed sorted collections; it has no LDAP string
    /// representation and must never be part of a name that is written
    /// to a directory.
    #[must_use]
    pub fn max_value() -> Rdn {
        Rdn { repr: Repr::Max }
    }

    /// Returns whether this RDN is the maximal sentinel.
    #[must_use]
    pub fn is_max_value(&self) -> bool {
        matches!(self.repr, Repr::Max)
    }

    /// Returns the AVAs in presentation order.
    ///
    /// The maximal sentinel has no AVAs.
    #[must_use]
    pub fn avas(&self) -> &[Ava] {
        match self.repr {
            Repr::Avas(ref avas) => avas,
            Repr::Max => &[],
        }
    }

    /// Returns the AVA of the given attribute type, if present.
    #[must_use]
    pub fn ava(&self, attribute_type: &AttributeType) -> Option<&Ava> {
        self.avas()
            .iter()
            .find(|ava| ava.attribute_type() == attribute_type)
    }

    /// Parses the string representation of a single RDN.
    pub fn parse(s: &str, schema: &Schema) -> Result<Rdn, DnParseError> {
        let mut reader = SubstringReader::new(s);
        reader.skip_whitespace();
        let rdn = Self::decode(&mut reader, schema)?;
        if reader.remaining() != 0 {
            return Err(InvalidNameSyntax::new(
                SyntaxViolation::UnexpectedCharacters,
                s,
            )
            .into());
        }
        Ok(rdn)
    }

    /// Decodes one RDN off the reader, consuming any `+`-joined AVAs.
    pub(super) fn decode(
        reader: &mut SubstringReader,
        schema: &Schema,
    ) -> Result<Rdn, DnParseError> {
        let mut avas: SmallVec<[Ava; 1]> = SmallVec::new();
        avas.push(Ava::decode(reader, schema)?);
        loop {
            reader.skip_whitespace();
            match reader.peek() {
                Ok('+') => {
                    let _ = reader.read();
                    avas.push(Ava::decode(reader, schema)?);
                }
                _ => break,
            }
        }
        Ok(Rdn {
            repr: Repr::Avas(avas),
        })
    }

    /// Returns the AVAs in comparison order.
    fn sorted_avas(&self) -> SmallVec<[&Ava; 2]> {
        let mut avas: SmallVec<[&Ava; 2]> = self.avas().iter().collect();
        avas.sort_unstable();
        avas
    }
}

//--- PartialEq and Eq

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rdn {}

//--- PartialOrd and Ord

impl PartialOrd for Rdn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rdn {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Max, Repr::Max) => Ordering::Equal,
            (Repr::Max, Repr::Avas(_)) => Ordering::Greater,
            (Repr::Avas(_), Repr::Max) => Ordering::Less,
            (Repr::Avas(left), Repr::Avas(right)) => {
                match left.len().cmp(&right.len()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                for (l, r) in
                    self.sorted_avas().iter().zip(other.sorted_avas())
                {
                    match l.cmp(&r) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                }
                Ordering::Equal
            }
        }
    }
}

//--- Hash

impl hash::Hash for Rdn {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self.repr {
            Repr::Max => state.write_u8(1),
            Repr::Avas(_) => {
                state.write_u8(0);
                for ava in self.sorted_avas() {
                    ava.hash(state);
                }
            }
        }
    }
}

//--- Display

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            Repr::Max => f.write_str("<maxValue>"),
            Repr::Avas(ref avas) => {
                for (idx, ava) in avas.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("+")?;
                    }
                    fmt::Display::fmt(ava, f)?;
                }
                Ok(())
            }
        }
    }
}

//============ Decoding Helpers ==============================================

/// Reads an attribute type name: a descriptor or a numeric OID.
fn decode_attribute_name<'a>(
    reader: &mut SubstringReader<'a>,
) -> Result<&'a str, InvalidNameSyntax> {
    let start = reader.pos();
    while let Ok(ch) = reader.peek() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
            let _ = reader.read();
        } else {
            break;
        }
    }
    let name = &reader.source()[start..reader.pos()];
    if name.is_empty() {
        Err(InvalidNameSyntax::new(
            SyntaxViolation::EmptyAttributeName,
            reader.source(),
        ))
    } else {
        Ok(name)
    }
}

/// Reads one attribute value in any of its three forms.
fn decode_value(
    reader: &mut SubstringReader,
) -> Result<String, InvalidNameSyntax> {
    match reader.peek() {
        Ok('"') => decode_quoted_value(reader),
        Ok('#') => decode_hex_value(reader),
        Ok(_) => decode_plain_value(reader),
        Err(_) => Ok(String::new()),
    }
}

/// Reads a plain value up to an unescaped `,`, `+`, or the end.
///
/// Unescaped trailing spaces are insignificant and dropped.
fn decode_plain_value(
    reader: &mut SubstringReader,
) -> Result<String, InvalidNameSyntax> {
    let mut buf = Vec::new();
    let mut keep = 0;
    loop {
        match reader.peek() {
            Ok(',') | Ok('+') | Err(_) => break,
            Ok('\\') => {
                let _ = reader.read();
                decode_escape(reader, &mut buf)?;
                keep = buf.len();
            }
            Ok(ch) => {
                let _ = reader.read();
                push_char(&mut buf, ch);
                if ch != ' ' {
                    keep = buf.len();
                }
            }
        }
    }
    buf.truncate(keep);
    utf8_value(buf, reader)
}

/// Reads a double-quoted value, including the closing quote.
fn decode_quoted_value(
    reader: &mut SubstringReader,
) -> Result<String, InvalidNameSyntax> {
    let _ = reader.read();
    let mut buf = Vec::new();
    loop {
        match reader.read() {
            Ok('"') => break,
            Ok('\\') => decode_escape(reader, &mut buf)?,
            Ok(ch) => push_char(&mut buf, ch),
            Err(_) => {
                return Err(InvalidNameSyntax::new(
                    SyntaxViolation::UnbalancedQuotes,
                    reader.source(),
                ))
            }
        }
    }
    utf8_value(buf, reader)
}

/// Reads a `#`-prefixed value: an even run of hex digits.
fn decode_hex_value(
    reader: &mut SubstringReader,
) -> Result<String, InvalidNameSyntax> {
    let _ = reader.read();
    let start = reader.pos();
    while let Ok(ch) = reader.peek() {
        if ch.is_ascii_hexdigit() {
            let _ = reader.read();
        } else {
            break;
        }
    }
    let hex = &reader.source()[start..reader.pos()];
    if hex.is_empty() || hex.len() % 2 != 0 {
        return Err(InvalidNameSyntax::new(
            SyntaxViolation::BadHexString,
            reader.source(),
        ));
    }
    let mut buf = Vec::with_capacity(hex.len() / 2);
    for idx in (0..hex.len()).step_by(2) {
        match u8::from_str_radix(&hex[idx..idx + 2], 16) {
            Ok(byte) => buf.push(byte),
            Err(_) => {
                return Err(InvalidNameSyntax::new(
                    SyntaxViolation::BadHexString,
                    reader.source(),
                ))
            }
        }
    }
    utf8_value(buf, reader)
}

/// Decodes what follows a backslash: a hex pair or a literal character.
fn decode_escape(
    reader: &mut SubstringReader,
    buf: &mut Vec<u8>,
) -> Result<(), InvalidNameSyntax> {
    let bad_escape = |reader: &SubstringReader| {
        InvalidNameSyntax::new(
            SyntaxViolation::BadEscape,
            reader.source(),
        )
    };
    let first = match reader.read() {
        Ok(ch) => ch,
        Err(_) => return Err(bad_escape(reader)),
    };
    if first.is_ascii_hexdigit() {
        let second = match reader.read() {
            Ok(ch) => ch,
            Err(_) => return Err(bad_escape(reader)),
        };
        match (first.to_digit(16), second.to_digit(16)) {
            (Some(hi), Some(lo)) => buf.push(((hi << 4) | lo) as u8),
            _ => return Err(bad_escape(reader)),
        }
    } else {
        push_char(buf, first);
    }
    Ok(())
}

/// Appends a character to a byte buffer in UTF-8.
fn push_char(buf: &mut Vec<u8>, ch: char) {
    let mut utf8 = [0u8; 4];
    buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
}

/// Converts collected value bytes into a string.
fn utf8_value(
    buf: Vec<u8>,
    reader: &SubstringReader,
) -> Result<String, InvalidNameSyntax> {
    String::from_utf8(buf).map_err(|_| {
        InvalidNameSyntax::new(
            SyntaxViolation::InvalidUtf8,
            reader.source(),
        )
    })
}

/// Writes a value with RFC 4514 escaping.
fn fmt_escaped_value(value: &str, f: &mut fmt::Formatter) -> fmt::Result {
    for (idx, ch) in value.char_indices() {
        match ch {
            '\0' => f.write_str("\\00")?,
            '"' | '+' | ',' | ';' | '<' | '>' | '\\' => {
                write!(f, "\\{}", ch)?
            }
            '#' | ' ' if idx == 0 => write!(f, "\\{}", ch)?,
            ' ' if idx + 1 == value.len() => write!(f, "\\{}", ch)?,
            _ => write!(f, "{}", ch)?,
        }
    }
    Ok(())
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn schema() -> Schema {
        Schema::core()
    }

    fn rdn(s: &str) -> Rdn {
        Rdn::parse(s, &schema()).unwrap()
    }

    fn ava(attr: &str, value: &str) -> Ava {
        Ava::new(schema().attribute_type(attr).unwrap(), value)
    }

    #[test]
    fn normalization_happens_at_construction() {
        let ava = ava("cn", "  John   SMITH ");
        assert_eq!(ava.value(), "  John   SMITH ");
        assert_eq!(ava.normalized_value(), "john smith");
    }

    #[test]
    fn parse_single() {
        let rdn = rdn("uid=bob");
        assert_eq!(rdn.avas().len(), 1);
        assert_eq!(rdn.avas()[0].value(), "bob");
        assert_eq!(
            rdn.avas()[0].attribute_type().identifier(),
            "uid"
        );
    }

    #[test]
    fn parse_multi_valued() {
        let rdn = rdn("cn=John Smith+sn=Smith");
        assert_eq!(rdn.avas().len(), 2);
        assert_eq!(rdn.avas()[0].value(), "John Smith");
        assert_eq!(rdn.avas()[1].value(), "Smith");

        let sn = schema().attribute_type("sn").unwrap();
        assert_eq!(rdn.ava(&sn).unwrap().value(), "Smith");
    }

    #[test]
    fn equality_is_multiset() {
        assert_eq!(rdn("cn=John+sn=Smith"), rdn("sn=smith+CN=john"));
        assert_ne!(rdn("cn=John+sn=Smith"), rdn("cn=John"));
        assert_ne!(rdn("cn=John"), rdn("sn=John"));
    }

    #[test]
    fn ordering() {
        // Fewer AVAs sort first, then type identifier, then normalized
        // value.
        let mut rdns = vec![
            rdn("cn=beta"),
            rdn("cn=Alpha+sn=x"),
            rdn("cn=alpha"),
            rdn("sn=alpha"),
        ];
        rdns.sort();
        assert_eq!(rdns[0], rdn("cn=alpha"));
        assert_eq!(rdns[1], rdn("cn=beta"));
        assert_eq!(rdns[2], rdn("sn=alpha"));
        assert_eq!(rdns[3], rdn("cn=alpha+sn=X"));
    }

    #[test]
    fn max_value_is_greatest() {
        let max = Rdn::max_value();
        assert!(max.is_max_value());
        assert!(max.avas().is_empty());
        assert_eq!(max, Rdn::max_value());
        for s in ["cn=zzzz", "uid=bob", "cn=a+sn=b"] {
            assert!(rdn(s) < max);
            assert!(max > rdn(s));
        }
    }

    #[test]
    fn display_escapes() {
        let rdn = Rdn::new(ava("cn", "Smith, John"));
        assert_eq!(rdn.to_string(), "cn=Smith\\, John");

        assert_eq!(
            Rdn::new(ava("cn", " leading")).to_string(),
            "cn=\\ leading"
        );
        assert_eq!(
            Rdn::new(ava("cn", "trailing ")).to_string(),
            "cn=trailing\\ "
        );
        assert_eq!(
            Rdn::new(ava("cn", "#tag")).to_string(),
            "cn=\\#tag"
        );
        assert_eq!(
            Rdn::new(ava("cn", "a\\b")).to_string(),
            "cn=a\\\\b"
        );
    }

    #[test]
    fn display_round_trips() {
        for value in ["Smith, John", "a+b", " x ", "#n", "a\\b"] {
            let before = Rdn::new(ava("cn", value));
            let after = Rdn::parse(&before.to_string(), &schema()).unwrap();
            assert_eq!(before, after, "value '{}'", value);
        }
    }

    #[test]
    fn from_avas() {
        assert!(Rdn::from_avas([]).is_none());
        let rdn =
            Rdn::from_avas([ava("cn", "John"), ava("sn", "Smith")]).unwrap();
        assert_eq!(rdn.avas().len(), 2);
    }

    #[test]
    fn parse_rejects_leftovers() {
        assert!(Rdn::parse("cn=John,dc=com", &schema()).is_err());
    }

    #[test]
    fn empty_value() {
        let rdn = rdn("description=");
        assert_eq!(rdn.avas()[0].value(), "");
    }
}
