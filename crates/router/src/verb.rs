//! HTTP verbs understood by the router.
//!
//! The verb set is small and fixed. [`Verb::Any`] is the catch-all entry a route can register to
//! serve every verb that has no specific handler.

use http::Method;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A routable HTTP verb.
///
/// Verbs are ordered, so verb sets always iterate as `ANY, GET, POST, PUT, DELETE, HEAD, PATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Any,
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl Verb {
    /// All verbs, in their natural order.
    pub const ALL: [Verb; 7] = [Verb::Any, Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::Head, Verb::Patch];

    /// Returns the upper-case token of this verb
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Any => "ANY",
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Patch => "PATCH",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a verb token case-insensitively.
///
/// Unknown tokens resolve to [`Verb::Any`], so a route registered with an unknown method name
/// becomes a catch-all route.
impl FromStr for Verb {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let verb = Verb::ALL
            .into_iter()
            .skip(1)
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(Verb::Any);
        Ok(verb)
    }
}

impl From<&Method> for Verb {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => Verb::Get,
            Method::POST => Verb::Post,
            Method::PUT => Verb::Put,
            Method::DELETE => Verb::Delete,
            Method::HEAD => Verb::Head,
            Method::PATCH => Verb::Patch,
            _ => Verb::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Verb;
    use http::Method;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Verb>(), Ok(Verb::Get));
        assert_eq!("Delete".parse::<Verb>(), Ok(Verb::Delete));
        assert_eq!("PATCH".parse::<Verb>(), Ok(Verb::Patch));
    }

    #[test]
    fn test_unknown_token_is_any() {
        assert_eq!("OPTIONS".parse::<Verb>(), Ok(Verb::Any));
        assert_eq!("".parse::<Verb>(), Ok(Verb::Any));
        assert_eq!("any".parse::<Verb>(), Ok(Verb::Any));
    }

    #[test]
    fn test_from_method() {
        assert_eq!(Verb::from(&Method::GET), Verb::Get);
        assert_eq!(Verb::from(&Method::HEAD), Verb::Head);
        assert_eq!(Verb::from(&Method::OPTIONS), Verb::Any);
        assert_eq!(Verb::from(&Method::TRACE), Verb::Any);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Verb::Post.to_string(), "POST");
        assert_eq!(serde_json::to_string(&Verb::Any).unwrap(), "\"ANY\"");
        assert_eq!(serde_json::to_string(&Verb::Delete).unwrap(), "\"DELETE\"");
    }

    #[test]
    fn test_order() {
        let mut verbs = vec![Verb::Patch, Verb::Get, Verb::Any, Verb::Head];
        verbs.sort();
        assert_eq!(verbs, vec![Verb::Any, Verb::Get, Verb::Head, Verb::Patch]);
    }
}
