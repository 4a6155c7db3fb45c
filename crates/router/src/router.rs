//! Request routing.
//!
//! Routing happens in two phases. During setup a [`RouterBuilder`] collects registrations and mounted
//! route groups on a single thread; [`RouterBuilder::build`] then freezes everything into a [`Router`],
//! which is read-only and can be shared by every connection task.
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use micro_router::{handler_fn, RequestContext, Router, Verb};
//!
//! let mut builder = Router::builder();
//! builder
//!     .get("/users/{id}", handler_fn(|req, resp| {
//!         let id = req.path_params().get("id").unwrap_or_default();
//!         *resp.body_mut() = Bytes::from(format!("user {id}"));
//!     }))
//!     .unwrap();
//! let router = builder.build();
//!
//! let route = router.at(Verb::Get, "/users/42").unwrap();
//! assert_eq!(route.full_path(), "/users/{id}");
//!
//! let mut req = RequestContext::from(Request::builder().uri("/users/42").body(Bytes::new()).unwrap());
//! let mut resp = Response::new(Bytes::new());
//! router.dispatch(&mut req, &mut resp).unwrap();
//! assert_eq!(resp.body().as_ref(), b"user 42");
//! ```

mod builder;

pub use builder::RouterBuilder;

use crate::aspect::Aspects;
use crate::error::{RouteError, RouteResult};
use crate::handler::{FollowUp, Handler};
use crate::route_index::{self, RouteIndex};
use crate::trie::RouteTrie;
use crate::{PathParams, RequestContext, Verb};
use bytes::Bytes;
use http::Response;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info};

/// The immutable routing table used at serve time
#[derive(Debug)]
pub struct Router {
    trie: RouteTrie,
    index: RouteIndex,
    aspects: Aspects,
    default_route: Option<String>,
}

/// A resolved route: the handler to invoke and what matching bound along the way
pub struct RouteMatch<'router, 'req> {
    verb: Verb,
    handler: &'router Arc<dyn Handler>,
    params: Vec<(&'router str, &'req str)>,
    full_path: &'router str,
    match_path: Option<&'req str>,
    compute_tag: Option<i32>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Resolves `verb` and `path` to a handler without invoking it.
    ///
    /// A single trailing `/` is ignored unless the path is exactly `/`. When the matched route has no
    /// handler for `verb`, its `ANY` handler is used instead.
    pub fn at<'router, 'req>(&'router self, verb: Verb, path: &'req str) -> RouteResult<RouteMatch<'router, 'req>> {
        let normalized = if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path };

        let found = self.trie.find(normalized).ok_or_else(|| RouteError::route_not_found(path))?;
        let handlers = self.trie.handlers(found.node);

        let (verb, handler) = handlers
            .get(verb)
            .map(|handler| (verb, handler))
            .or_else(|| handlers.get(Verb::Any).map(|handler| (Verb::Any, handler)))
            .ok_or_else(|| RouteError::verb_not_implemented(verb, path))?;

        Ok(RouteMatch {
            verb,
            handler,
            params: found.params,
            full_path: handlers.registered_path(),
            match_path: found.match_path,
            compute_tag: handlers.compute_tag(),
        })
    }

    /// Routes a request and invokes the resolved handler.
    ///
    /// The verb and path are taken from `req`. On success the route's path parameters, registered
    /// pattern, wildcard suffix and compute tag are attached to `req` before the aspect pipeline and
    /// the handler run. The returned [`FollowUp`], if any, is left to the caller's scheduler.
    ///
    /// If the request does not resolve and a default route is configured, the default route is tried
    /// once with the same verb. The first miss is reported if that fails too.
    pub fn dispatch(&self, req: &mut RequestContext, resp: &mut Response<Bytes>) -> RouteResult<Option<FollowUp>> {
        let verb = Verb::from(req.method());

        let (handler, path_params, full_path, match_path, compute_tag) = {
            let route = self.resolve(verb, req.path())?;
            (route.handler, route.path_params(), route.full_path, route.match_path.map(ToOwned::to_owned), route.compute_tag)
        };

        debug!(%verb, path = req.path(), route = full_path, "dispatch request");
        req.attach_route(path_params, full_path, match_path, compute_tag);

        Ok(self.aspects.invoke(handler.as_ref(), req, resp))
    }

    fn resolve<'router: 'req, 'req>(&'router self, verb: Verb, path: &'req str) -> RouteResult<RouteMatch<'router, 'req>> {
        match (self.at(verb, path), self.default_route.as_deref()) {
            (Err(e), Some(default_route)) if e.is_dispatch_miss() => {
                debug!(%verb, path, default_route, "falling back to default route");
                self.at(verb, default_route).or(Err(e))
            }
            (result, _) => result,
        }
    }

    /// Lazily lists the registered routes in path order
    pub fn list_routes(&self) -> route_index::Iter<'_> {
        self.index.iter()
    }

    /// Returns every `(verb, path)` pair reachable in the routing tree, with paths rebuilt from the
    /// tree's segments
    pub fn all_routes(&self) -> Vec<(Verb, String)> {
        self.trie
            .leaves()
            .into_iter()
            .flat_map(|(relative, id)| {
                let path = if relative.starts_with('/') { relative } else { format!("/{relative}") };
                self.trie.handlers(id).verbs().map(move |verb| (verb, path.clone())).collect::<Vec<_>>()
            })
            .collect()
    }

    /// Logs one line per registered `(verb, path)` pair
    pub fn print_routes(&self) {
        for entry in self.list_routes() {
            for verb in entry.verbs {
                info!("{verb}\t{}", entry.path);
            }
        }
    }

    /// Logs the layout of the routing tree
    pub fn print_tree(&self) {
        self.trie.print_tree();
    }
}

impl<'router, 'req> RouteMatch<'router, 'req> {
    /// The verb whose handler was selected, [`Verb::Any`] when the fallback was used
    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn handler(&self) -> &'router dyn Handler {
        self.handler.as_ref()
    }

    /// Parameter bindings, in binding order
    pub fn params(&self) -> &[(&'router str, &'req str)] {
        &self.params
    }

    pub fn path_params(&self) -> PathParams {
        self.params.iter().map(|&(name, value)| (name, value)).collect()
    }

    /// The registered pattern of the matched route
    pub fn full_path(&self) -> &'router str {
        self.full_path
    }

    /// The request path text captured by a wildcard segment
    pub fn match_path(&self) -> Option<&'req str> {
        self.match_path
    }

    pub fn compute_tag(&self) -> Option<i32> {
        self.compute_tag
    }
}

impl Debug for RouteMatch<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("verb", &self.verb)
            .field("params", &self.params)
            .field("full_path", &self.full_path)
            .field("match_path", &self.match_path)
            .field("compute_tag", &self.compute_tag)
            .finish_non_exhaustive()
    }
}
