use super::Router;
use crate::aspect::Aspects;
use crate::error::{RouteError, RouteResult};
use crate::handler::Handler;
use crate::route_index::{self, RouteIndex};
use crate::trie::{NodeId, RouteTrie, VerbHandlers};
use crate::Verb;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Collects route registrations before the server starts.
///
/// Every method takes `&mut self` so registrations can be chained with `?`. A failed call leaves the
/// builder as it was before the call.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    trie: RouteTrie,
    index: RouteIndex,
    aspects: Aspects,
    default_route: Option<String>,
}

macro_rules! verb_route {
    ($name:ident, $verb:expr) => {
        #[doc = concat!("Registers `handler` for `", stringify!($name), "` requests to `path`")]
        pub fn $name<H: Handler + 'static>(&mut self, path: &str, handler: H) -> RouteResult<&mut Self> {
            self.register(path, $verb, handler, None)
        }
    };
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    verb_route!(get, Verb::Get);
    verb_route!(post, Verb::Post);
    verb_route!(put, Verb::Put);
    verb_route!(delete, Verb::Delete);
    verb_route!(head, Verb::Head);
    verb_route!(patch, Verb::Patch);
    verb_route!(any, Verb::Any);

    /// Registers `handler` for `verb` requests to `path`.
    ///
    /// `path` may hold literal, `{name}` and `prefix*` segments. `compute_tag` is stored with the route
    /// and handed to the handler through the request context.
    ///
    /// # Errors
    ///
    /// - [`RouteError::EmptyPath`] for an empty path
    /// - [`RouteError::DuplicateRegistration`] when `verb` is already registered for this path
    /// - [`RouteError::AmbiguousCapture`] when the path would add a second parameter or wildcard
    ///   segment next to an existing one
    pub fn register<H: Handler + 'static>(
        &mut self,
        path: &str,
        verb: Verb,
        handler: H,
        compute_tag: Option<i32>,
    ) -> RouteResult<&mut Self> {
        self.add_route(path, &[verb], Arc::new(handler), compute_tag)
    }

    /// Like [`register`](Self::register), with `aspects` running around this route's handler after the
    /// router-wide aspects
    pub fn register_with<H: Handler + 'static>(
        &mut self,
        path: &str,
        verb: Verb,
        handler: H,
        compute_tag: Option<i32>,
        aspects: &Aspects,
    ) -> RouteResult<&mut Self> {
        self.add_route(path, &[verb], aspects.wrap(Arc::new(handler)), compute_tag)
    }

    /// Registers one shared `handler` for several method tokens at once.
    ///
    /// Tokens are matched case-insensitively and unknown tokens register the `ANY` verb. An empty
    /// token list registers `ANY` as well. Either every verb is registered or none is.
    pub fn route<H: Handler + 'static>(&mut self, path: &str, methods: &[&str], handler: H) -> RouteResult<&mut Self> {
        let mut verbs = methods.iter().map(|method| method.parse().unwrap_or(Verb::Any)).collect::<BTreeSet<Verb>>();
        if verbs.is_empty() {
            verbs.insert(Verb::Any);
        }

        let verbs = verbs.into_iter().collect::<Vec<_>>();
        self.add_route(path, &verbs, Arc::new(handler), None)
    }

    /// Sets the aspects that run around every dispatched handler
    pub fn aspects(&mut self, aspects: Aspects) -> &mut Self {
        self.aspects = aspects;
        self
    }

    /// Sets the path dispatch falls back to when a request does not resolve
    pub fn default_route(&mut self, path: &str) -> &mut Self {
        self.default_route = Some(path.to_owned());
        self
    }

    fn add_route(
        &mut self,
        path: &str,
        verbs: &[Verb],
        handler: Arc<dyn Handler>,
        compute_tag: Option<i32>,
    ) -> RouteResult<&mut Self> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }

        if let Some((existing, conflicting)) = self.trie.capture_conflict(path) {
            error!(path, existing, conflicting, "ambiguous capture segment");
            return Err(RouteError::ambiguous_capture(path, existing, conflicting));
        }

        let id = self.trie.insert(path);
        if let Some(&verb) = verbs.iter().find(|&&verb| self.trie.handlers(id).contains(verb)) {
            error!(%verb, path, "route already registered");
            return Err(RouteError::duplicate_registration(verb, path));
        }

        let handlers = self.trie.handlers_mut(id);
        for &verb in verbs {
            handlers.insert(verb, Arc::clone(&handler));
        }
        let previous_path = handlers.registered_path().to_owned();
        handlers.set_route(path, compute_tag);

        self.sync_index(id, &previous_path);
        Ok(self)
    }

    /// Rewrites the index entry of `id` after its handlers changed, dropping the entry recorded under
    /// `previous_path` when the node is now known by another spelling
    fn sync_index(&mut self, id: NodeId, previous_path: &str) {
        let handlers = self.trie.handlers(id);
        if !previous_path.is_empty() && previous_path != handlers.registered_path() {
            self.index.remove(previous_path);
        }
        self.index.replace(handlers.registered_path(), handlers.verbs().collect());
    }

    /// Copies every route of `sub` into this builder under `prefix`.
    ///
    /// A route `/health` of `sub` mounted at `/api/v1` answers at `/api/v1/health` with the same
    /// handlers and compute tag. `sub` is left untouched. Existing routes at a destination are
    /// replaced, which is logged per overridden verb. Router-wide aspects of `sub` are not carried
    /// over, mounted routes run this builder's aspects.
    ///
    /// # Errors
    ///
    /// [`RouteError::AmbiguousCapture`] when a destination would add a second parameter or wildcard
    /// segment to a node. Destinations are all checked before anything is copied.
    pub fn mount(&mut self, sub: &RouterBuilder, prefix: &str) -> RouteResult<&mut Self> {
        let routes = sub
            .trie
            .leaves()
            .into_iter()
            .map(|(relative, id)| (mount_path(prefix, &relative), sub.trie.handlers(id)))
            .collect::<Vec<_>>();

        for (destination, _) in &routes {
            if let Some((existing, conflicting)) = self.trie.capture_conflict(destination) {
                error!(path = destination.as_str(), existing, conflicting, "ambiguous capture while mounting");
                return Err(RouteError::ambiguous_capture(destination, existing, conflicting));
            }
        }

        for (destination, source) in routes {
            let id = self.trie.insert(&destination);
            let target = self.trie.handlers_mut(id);
            for verb in target.verbs() {
                warn!(%verb, path = destination.as_str(), "mount overrides registered route");
            }

            let previous_path = target.registered_path().to_owned();
            let mut copied = VerbHandlers::clone(source);
            copied.set_route(&destination, source.compute_tag());
            *target = copied;

            self.sync_index(id, &previous_path);
        }

        info!(prefix, "mounted route group");
        Ok(self)
    }

    /// Lazily lists the routes registered so far in path order
    pub fn list_routes(&self) -> route_index::Iter<'_> {
        self.index.iter()
    }

    /// Logs the layout of the routing tree
    pub fn print_tree(&self) {
        self.trie.print_tree();
    }

    /// Freezes the registrations into a [`Router`]
    pub fn build(self) -> Router {
        Router { trie: self.trie, index: self.index, aspects: self.aspects, default_route: self.default_route }
    }
}

/// Joins a mount prefix and a route path relative to the mounted trie's root.
///
/// Exactly one `/` separates the two parts, a trailing `/` is dropped and an empty result is `/`.
fn mount_path(prefix: &str, relative: &str) -> String {
    let mut path = prefix.strip_suffix('/').unwrap_or(prefix).to_owned();
    if !relative.starts_with('/') {
        path.push('/');
    }
    path.push_str(relative);

    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}
