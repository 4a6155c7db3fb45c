//! Request context handed to route handlers.
//!
//! This module contains the core types for reading a routed request:
//! - `RequestContext`: the upstream-parsed request head and body, plus the routing information
//!   attached by [`Router::dispatch`](crate::Router::dispatch)
//! - `PathParams`: the named parameters bound while matching the request path

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

/// Represents the context of an HTTP request, providing access to the request head, its body
/// and the route it resolved to.
///
/// The router never parses or normalizes the request itself, the head is expected to come from the
/// protocol layer with a path that is already decoded and dot-segment free.
#[derive(Debug)]
pub struct RequestContext {
    head: Parts,
    body: Bytes,
    path_params: PathParams,
    full_path: String,
    match_path: Option<String>,
    compute_tag: Option<i32>,
}

impl RequestContext {
    /// Creates a new RequestContext from a parsed request head and its body
    pub fn new(head: Parts, body: Bytes) -> Self {
        Self { head, body, path_params: PathParams::empty(), full_path: String::new(), match_path: None, compute_tag: None }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// Returns the request path, the input of route matching
    pub fn path(&self) -> &str {
        self.head.uri.path()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.head.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Returns the request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns the registered pattern of the matched route, e.g. `/users/{id}`
    ///
    /// Empty until the request has been dispatched.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Returns the path text captured by a wildcard segment, if the matched route has one
    pub fn match_path(&self) -> Option<&str> {
        self.match_path.as_deref()
    }

    /// Returns the compute tag registered with the matched route
    pub fn compute_tag(&self) -> Option<i32> {
        self.compute_tag
    }

    pub(crate) fn attach_route(
        &mut self,
        path_params: PathParams,
        full_path: &str,
        match_path: Option<String>,
        compute_tag: Option<i32>,
    ) {
        self.path_params = path_params;
        full_path.clone_into(&mut self.full_path);
        self.match_path = match_path;
        self.compute_tag = compute_tag;
    }
}

impl From<Request<Bytes>> for RequestContext {
    fn from(request: Request<Bytes>) -> Self {
        let (head, body) = request.into_parts();
        Self::new(head, body)
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Path parameters are named segments in the route pattern that bind exactly one request path
/// segment. For example, in the pattern "/users/{id}", "id" is a path parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of bound path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    ///
    /// If a name is bound twice the later binding wins.
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().rev().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    /// Iterates the parameters in binding order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        Self { params: iter.into_iter().map(|(name, value)| (name.to_owned(), value.to_owned())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::{PathParams, RequestContext};
    use bytes::Bytes;
    use http::{Method, Request};

    #[test]
    fn test_params_get() {
        let params: PathParams = [("id", "42"), ("postId", "7")].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("postId"), Some("7"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_params_later_binding_wins() {
        let params: PathParams = [("id", "1"), ("id", "2")].into_iter().collect();
        assert_eq!(params.get("id"), Some("2"));
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("id", "1"), ("id", "2")]);
    }

    #[test]
    fn test_context_before_dispatch() {
        let request = Request::builder().method(Method::POST).uri("/users?page=2").body(Bytes::from_static(b"hi")).unwrap();
        let ctx = RequestContext::from(request);

        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.body().as_ref(), b"hi");
        assert!(ctx.path_params().is_empty());
        assert_eq!(ctx.full_path(), "");
        assert_eq!(ctx.match_path(), None);
        assert_eq!(ctx.compute_tag(), None);
    }

    #[test]
    fn test_attach_route() {
        let request = Request::builder().uri("/static/css/app.css").body(Bytes::new()).unwrap();
        let mut ctx = RequestContext::from(request);
        ctx.attach_route(PathParams::empty(), "/static/*", Some("css/app.css".into()), Some(3));

        assert_eq!(ctx.full_path(), "/static/*");
        assert_eq!(ctx.match_path(), Some("css/app.css"));
        assert_eq!(ctx.compute_tag(), Some(3));
    }
}
