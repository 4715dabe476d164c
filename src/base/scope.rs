//! Search scopes.

use core::fmt;

//------------ SearchScope ---------------------------------------------------

/// The scope of a directory search relative to a base DN.
///
/// Scopes are represented on the wire by an integer. The type wraps this
/// value so that unassigned values remain representable: a scope that is
/// not one of the four assigned constants never matches any DN in
/// [`Dn::is_in_scope_of`][crate::base::name::Dn::is_in_scope_of].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SearchScope(u32);

impl SearchScope {
    /// The base DN itself and nothing else.
    pub const BASE_OBJECT: SearchScope = SearchScope(0);

    /// The immediate children of the base DN, excluding the base itself.
    pub const SINGLE_LEVEL: SearchScope = SearchScope(1);

    /// The base DN and all its subordinates.
    pub const WHOLE_SUBTREE: SearchScope = SearchScope(2);

    /// All subordinates of the base DN, excluding the base itself.
    pub const SUBORDINATES: SearchScope = SearchScope(3);

    /// Creates a scope from its integer value.
    #[must_use]
    pub fn from_int(value: u32) -> Self {
        SearchScope(value)
    }

    /// Returns the integer value of the scope.
    #[must_use]
    pub fn to_int(self) -> u32 {
        self.0
    }
}

//--- From

impl From<u32> for SearchScope {
    fn from(value: u32) -> Self {
        SearchScope::from_int(value)
    }
}

impl From<SearchScope> for u32 {
    fn from(scope: SearchScope) -> Self {
        scope.to_int()
    }
}

//--- Display

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SearchScope::BASE_OBJECT => f.write_str("baseObject"),
            SearchScope::SINGLE_LEVEL => f.write_str("singleLevel"),
            SearchScope::WHOLE_SUBTREE => f.write_str("wholeSubtree"),
            SearchScope::SUBORDINATES => f.write_str("subordinateSubtree"),
            SearchScope(value) => write!(f, "scope{}", value),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn int_round_trip() {
        for value in 0..6 {
            assert_eq!(SearchScope::from_int(value).to_int(), value);
        }
        assert_eq!(SearchScope::from(1u32), SearchScope::SINGLE_LEVEL);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", SearchScope::BASE_OBJECT), "baseObject");
        assert_eq!(format!("{}", SearchScope::WHOLE_SUBTREE), "wholeSubtree");
        assert_eq!(format!("{}", SearchScope::from_int(17)), "scope17");
    }
}
