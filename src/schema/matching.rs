//! Matching rules.
//!
//! A matching rule describes how attribute values are normalized before
//! they are compared. Each rule can provide up to three capabilities:
//! normalization for equality, for ordering, and for substring matching.
//! Two values are equal, correctly ordered, or substring-contained iff
//! their normalized forms are under plain byte comparison.
//!
//! The rules form a closed set of variants resolved through schema
//! lookup; see [`MatchingRule`]. A rule that is asked for a capability it
//! does not provide fails with [`UnsupportedMatchingOperation`].

use core::fmt;
use std::borrow::Cow;

//------------ MatchingRule --------------------------------------------------

/// A normalization strategy for attribute values.
///
/// The variants carry the names and OIDs of the matching rules they
/// implement as registered for LDAP. New kinds of rules are added by
/// extending this enum.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatchingRule {
    /// Case- and whitespace-insensitive string matching.
    ///
    /// Implements `caseIgnoreMatch` and its ordering and substring
    /// companions: values are lowercased, runs of interior spaces are
    /// collapsed to one, and leading and trailing spaces are removed. A
    /// non-empty value consisting entirely of spaces normalizes to a
    /// single space so that it stays distinct from the empty value.
    CaseIgnore,

    /// Exact byte-for-byte matching, `octetStringMatch`.
    OctetString,

    /// Numeric string matching, `numericStringMatch`.
    ///
    /// All characters other than ASCII digits are removed before
    /// comparison, so `"+1 612 555 1234"` and `"16125551234"` are equal.
    NumericString,

    /// Integer matching on the first component of a descriptor,
    /// `integerFirstComponentMatch`.
    ///
    /// Intended for values that consist of a parenthesized,
    /// space-delimited descriptor such as `( 2 NAME 'foo' )`: the first
    /// token after the opening parenthesis is parsed as an integer and
    /// its canonical decimal form becomes the normalized value. On any
    /// structural deviation the original value is returned unchanged;
    /// this rule is advisory and must not block directory writes.
    IntegerFirstComponent,
}

impl MatchingRule {
    /// Returns the registered name of the rule's equality flavor.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MatchingRule::CaseIgnore => "caseIgnoreMatch",
            MatchingRule::OctetString => "octetStringMatch",
            MatchingRule::NumericString => "numericStringMatch",
            MatchingRule::IntegerFirstComponent => {
                "integerFirstComponentMatch"
            }
        }
    }

    /// Returns the OID of the rule's equality flavor.
    #[must_use]
    pub fn oid(self) -> &'static str {
        match self {
            MatchingRule::CaseIgnore => "2.5.13.2",
            MatchingRule::OctetString => "2.5.13.17",
            MatchingRule::NumericString => "2.5.13.8",
            MatchingRule::IntegerFirstComponent => "2.5.13.29",
        }
    }

    /// Returns whether the rule provides the given operation.
    #[must_use]
    pub fn supports(self, operation: MatchOperation) -> bool {
        match (self, operation) {
            (MatchingRule::CaseIgnore, _) => true,
            (MatchingRule::OctetString, _) => true,
            (MatchingRule::NumericString, MatchOperation::Ordering) => false,
            (MatchingRule::NumericString, _) => true,
            (
                MatchingRule::IntegerFirstComponent,
                MatchOperation::Equality,
            ) => true,
            (MatchingRule::IntegerFirstComponent, _) => false,
        }
    }

    /// Normalizes a value for equality comparison.
    pub fn normalize_for_equality<'a>(
        self,
        value: &'a str,
    ) -> Result<Cow<'a, str>, UnsupportedMatchingOperation> {
        match self {
            MatchingRule::CaseIgnore => Ok(fold_case_and_space(value)),
            MatchingRule::OctetString => Ok(Cow::Borrowed(value)),
            MatchingRule::NumericString => Ok(strip_non_digits(value)),
            MatchingRule::IntegerFirstComponent => {
                Ok(first_component_integer(value))
            }
        }
    }

    /// Normalizes a value for ordering comparison.
    pub fn normalize_for_ordering<'a>(
        self,
        value: &'a str,
    ) -> Result<Cow<'a, str>, UnsupportedMatchingOperation> {
        match self {
            MatchingRule::CaseIgnore => Ok(fold_case_and_space(value)),
            MatchingRule::OctetString => Ok(Cow::Borrowed(value)),
            _ => Err(self.unsupported(MatchOperation::Ordering)),
        }
    }

    /// Normalizes a value for substring matching.
    ///
    /// Both candidate values and the individual query substrings are
    /// normalized with this operation before containment is checked.
    pub fn normalize_for_substring<'a>(
        self,
        value: &'a str,
    ) -> Result<Cow<'a, str>, UnsupportedMatchingOperation> {
        match self {
            MatchingRule::CaseIgnore => Ok(fold_case_and_space(value)),
            MatchingRule::OctetString => Ok(Cow::Borrowed(value)),
            MatchingRule::NumericString => Ok(strip_non_digits(value)),
            MatchingRule::IntegerFirstComponent => {
                Err(self.unsupported(MatchOperation::Substring))
            }
        }
    }

    /// Evaluates a substring assertion against a value.
    ///
    /// The assertion matches if the normalized value starts with the
    /// normalized `initial` part (when present), then contains each
    /// normalized `any` part in order without overlap, and finally ends
    /// with the normalized `final_part` (when present) after all other
    /// parts.
    pub fn matches_substrings(
        self,
        value: &str,
        initial: Option<&str>,
        any: &[&str],
        final_part: Option<&str>,
    ) -> Result<bool, UnsupportedMatchingOperation> {
        let value = self.normalize_for_substring(value)?;
        let mut rest = value.as_ref();

        if let Some(initial) = initial {
            let initial = self.normalize_for_substring(initial)?;
            match rest.strip_prefix(initial.as_ref()) {
                Some(tail) => rest = tail,
                None => return Ok(false),
            }
        }
        for part in any {
            let part = self.normalize_for_substring(part)?;
            match rest.find(part.as_ref()) {
                Some(idx) => rest = &rest[idx + part.len()..],
                None => return Ok(false),
            }
        }
        if let Some(final_part) = final_part {
            let final_part = self.normalize_for_substring(final_part)?;
            if !rest.ends_with(final_part.as_ref()) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Creates the error for an operation the rule does not provide.
    fn unsupported(
        self,
        operation: MatchOperation,
    ) -> UnsupportedMatchingOperation {
        UnsupportedMatchingOperation {
            rule: self,
            operation,
        }
    }
}

//--- Display

impl fmt::Display for MatchingRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

//------------ MatchOperation ------------------------------------------------

/// The capability requested from a matching rule.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatchOperation {
    /// Normalization for equality comparison.
    Equality,

    /// Normalization for ordering comparison.
    Ordering,

    /// Normalization for substring matching.
    Substring,
}

//--- Display

impl fmt::Display for MatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MatchOperation::Equality => f.write_str("equality"),
            MatchOperation::Ordering => f.write_str("ordering"),
            MatchOperation::Substring => f.write_str("substring"),
        }
    }
}

//============ Normalization Algorithms ======================================

/// Lowercases, trims, and collapses runs of interior spaces.
///
/// A non-empty input that normalizes to nothing becomes a single space,
/// keeping all-whitespace values distinct from truly empty ones.
fn fold_case_and_space(value: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == ' ' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    if out.is_empty() && !value.is_empty() {
        out.push(' ');
    }
    if out == value {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(out)
    }
}

/// Removes every character that is not an ASCII digit.
fn strip_non_digits(value: &str) -> Cow<'_, str> {
    if value.bytes().all(|ch| ch.is_ascii_digit()) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(char::is_ascii_digit).collect())
    }
}

/// Extracts the first component of a descriptor value as an integer.
///
/// After case and space folding, the value must start with an opening
/// parenthesis followed by a space-delimited token that parses as an
/// integer; the token's canonical decimal form is the normalized value.
/// Any structural deviation returns the original value unchanged.
fn first_component_integer(value: &str) -> Cow<'_, str> {
    let folded = fold_case_and_space(value);

    let mut tail = match folded.strip_prefix('(') {
        Some(tail) => tail,
        None => return Cow::Borrowed(value),
    };
    tail = tail.trim_start_matches(' ');

    let token = match tail.split(' ').next() {
        Some(token) if !token.is_empty() => token,
        _ => return Cow::Borrowed(value),
    };
    // The token must be followed by more of the descriptor; a value that
    // ends right after the first component is not well-formed.
    if token.len() == tail.len() {
        return Cow::Borrowed(value);
    }

    match token.parse::<i64>() {
        Ok(int) => Cow::Owned(int.to_string()),
        Err(_) => Cow::Borrowed(value),
    }
}

//============ Error Types ===================================================

//------------ UnsupportedMatchingOperation ----------------------------------

/// A matching rule was asked for a capability it does not provide.
///
/// This indicates a programming or configuration error: the schema
/// declared a rule for an operation the rule cannot perform. The calling
/// operation fails; there is nothing to retry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnsupportedMatchingOperation {
    rule: MatchingRule,
    operation: MatchOperation,
}

impl UnsupportedMatchingOperation {
    /// Returns the rule the operation was requested from.
    #[must_use]
    pub fn rule(&self) -> MatchingRule {
        self.rule
    }

    /// Returns the requested operation.
    #[must_use]
    pub fn operation(&self) -> MatchOperation {
        self.operation
    }
}

//--- Display and Error

impl fmt::Display for UnsupportedMatchingOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "matching rule {} does not support {} matching",
            self.rule, self.operation
        )
    }
}

impl std::error::Error for UnsupportedMatchingOperation {}

//============ Testing =======================================================
