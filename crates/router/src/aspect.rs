//! Before/after hooks around handler invocation.
//!
//! An [`Aspect`] sees every request before its handler runs and may intercept it, then sees the
//! request again once the handler returned. Aspects are collected in an ordered [`Aspects`] list
//! that is handed to the router explicitly, either for all routes through
//! [`RouterBuilder::aspects`](crate::RouterBuilder::aspects) or for a single route through
//! [`RouterBuilder::register_with`](crate::RouterBuilder::register_with).
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use http::{Response, StatusCode};
//! use micro_router::{Aspect, Aspects, RequestContext};
//!
//! struct RequireToken;
//!
//! impl Aspect for RequireToken {
//!     fn before(&self, req: &RequestContext, resp: &mut Response<Bytes>) -> bool {
//!         if req.headers().contains_key("x-token") {
//!             return true;
//!         }
//!         *resp.status_mut() = StatusCode::UNAUTHORIZED;
//!         false
//!     }
//! }
//!
//! let aspects = Aspects::builder().add_last(RequireToken).build();
//! assert_eq!(aspects.len(), 1);
//! ```

use crate::handler::{FollowUp, Handler};
use crate::RequestContext;
use bytes::Bytes;
use http::Response;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
pub trait Aspect: Send + Sync {
    /// Runs before the handler. Returning `false` intercepts the request: neither the handler nor
    /// any later aspect runs, and the response is left as this aspect wrote it.
    fn before(&self, _req: &RequestContext, _resp: &mut Response<Bytes>) -> bool {
        true
    }

    /// Runs after the handler returned, in reverse registration order.
    fn after(&self, _req: &RequestContext, _resp: &mut Response<Bytes>) {}
}

/// An ordered list of [`Aspect`]s
#[derive(Clone, Default)]
pub struct Aspects {
    inner: Vec<Arc<dyn Aspect>>,
}

impl Aspects {
    pub fn builder() -> AspectsBuilder {
        AspectsBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Invokes `handler` surrounded by this list's hooks.
    ///
    /// Returns `None` without calling the handler when a `before` hook intercepts the request.
    pub fn invoke(&self, handler: &dyn Handler, req: &RequestContext, resp: &mut Response<Bytes>) -> Option<FollowUp> {
        for (index, aspect) in self.inner.iter().enumerate() {
            if !aspect.before(req, resp) {
                debug!(aspect = index, path = req.path(), "request intercepted");
                return None;
            }
        }

        let follow_up = handler.invoke(req, resp);

        for aspect in self.inner.iter().rev() {
            aspect.after(req, resp);
        }

        follow_up
    }

    /// Wraps `handler` so that every invocation runs through this list's hooks
    pub fn wrap(&self, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        if self.is_empty() {
            return handler;
        }
        Arc::new(AspectHandler { aspects: self.clone(), handler })
    }
}

impl Debug for Aspects {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aspects").field("len", &self.inner.len()).finish()
    }
}

pub struct AspectsBuilder {
    inner: Vec<Arc<dyn Aspect>>,
}

impl AspectsBuilder {
    fn new() -> Self {
        Self { inner: vec![] }
    }

    pub fn add_last<A: Aspect + 'static>(mut self, aspect: A) -> Self {
        self.inner.push(Arc::new(aspect));
        self
    }

    pub fn add_first<A: Aspect + 'static>(mut self, aspect: A) -> Self {
        self.inner.insert(0, Arc::new(aspect));
        self
    }

    pub fn build(self) -> Aspects {
        Aspects { inner: self.inner }
    }
}

impl Debug for AspectsBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AspectsBuilder").field("len", &self.inner.len()).finish()
    }
}

/// A handler whose invocations run through a route-scoped [`Aspects`] list
struct AspectHandler {
    aspects: Aspects,
    handler: Arc<dyn Handler>,
}

impl Handler for AspectHandler {
    fn invoke(&self, req: &RequestContext, resp: &mut Response<Bytes>) -> Option<FollowUp> {
        self.aspects.invoke(self.handler.as_ref(), req, resp)
    }
}
