//! Segment trie that maps route patterns to their handlers.
//!
//! Every node stands for one segment of a registered pattern and is keyed by the segment text in its
//! parent's children map. Literal, parameter (`{name}`) and wildcard (`prefix*`) segments are all stored
//! the same way, they only differ in how [`RouteTrie::find`] treats them:
//!
//! 1. an exact literal child is tried first, with full depth-first descent;
//! 2. then a wildcard child whose prefix starts the request segment, which captures the rest of the path;
//! 3. then a parameter child, which binds the request segment and continues with the next one.
//!
//! Nodes live in an arena owned by the trie and refer to each other by [`NodeId`]. Nothing is ever
//! removed, dropping the trie drops every node.

mod segment;

pub use segment::Segment;
pub(crate) use segment::Segments;

use crate::handler::Handler;
use crate::Verb;
use segment::next_segment;
use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Index of a node in the trie's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

/// The handlers registered on one node, keyed by verb, with the pattern that registered them
#[derive(Clone, Default)]
pub struct VerbHandlers {
    handlers: BTreeMap<Verb, Arc<dyn Handler>>,
    registered_path: String,
    compute_tag: Option<i32>,
}

impl VerbHandlers {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn get(&self, verb: Verb) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(&verb)
    }

    pub fn contains(&self, verb: Verb) -> bool {
        self.handlers.contains_key(&verb)
    }

    /// The registered verbs, in verb order
    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.handlers.keys().copied()
    }

    /// The full pattern this node was registered under, e.g. `/users/{id}`
    pub fn registered_path(&self) -> &str {
        &self.registered_path
    }

    pub fn compute_tag(&self) -> Option<i32> {
        self.compute_tag
    }

    pub(crate) fn insert(&mut self, verb: Verb, handler: Arc<dyn Handler>) {
        self.handlers.insert(verb, handler);
    }

    pub(crate) fn set_route(&mut self, registered_path: &str, compute_tag: Option<i32>) {
        registered_path.clone_into(&mut self.registered_path);
        self.compute_tag = compute_tag;
    }
}

impl Debug for VerbHandlers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerbHandlers")
            .field("verbs", &self.handlers.keys().collect::<Vec<_>>())
            .field("registered_path", &self.registered_path)
            .field("compute_tag", &self.compute_tag)
            .finish()
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<String, NodeId>,
    handlers: VerbHandlers,
}

/// The outcome of a successful [`RouteTrie::find`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieMatch<'t, 'p> {
    pub node: NodeId,
    /// Parameter bindings in the order they were made
    pub params: Vec<(&'t str, &'p str)>,
    /// Request path text consumed by a wildcard segment
    pub match_path: Option<&'p str>,
}

#[derive(Debug)]
pub struct RouteTrie {
    nodes: Vec<TrieNode>,
}

impl Default for RouteTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::default()] }
    }

    /// Returns the number of nodes, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when nothing has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn handlers(&self, id: NodeId) -> &VerbHandlers {
        &self.nodes[id.0].handlers
    }

    pub(crate) fn handlers_mut(&mut self, id: NodeId) -> &mut VerbHandlers {
        &mut self.nodes[id.0].handlers
    }

    /// Finds or creates the node for `path`.
    ///
    /// Inserting the same path twice returns the same node, and so do paths that only differ by a
    /// trailing `/`. Segment text is never validated, `{bad` is just a literal.
    pub fn insert(&mut self, path: &str) -> NodeId {
        Segments::new(path).fold(ROOT, |current, segment| self.child_or_insert(current, segment))
    }

    fn child_or_insert(&mut self, parent: NodeId, segment: &str) -> NodeId {
        if let Some(&child) = self.nodes[parent.0].children.get(segment) {
            return child;
        }

        let child = NodeId(self.nodes.len());
        self.nodes.push(TrieNode::default());
        self.nodes[parent.0].children.insert(segment.to_owned(), child);
        child
    }

    /// Resolves a request path to a node.
    ///
    /// The path is expected to be normalized upstream. Returns `None` when no branch matches, which is
    /// the ordinary outcome for unknown paths.
    pub fn find<'t, 'p>(&'t self, path: &'p str) -> Option<TrieMatch<'t, 'p>> {
        let mut params = Vec::new();
        let mut match_path = None;
        let node = self.find_from(ROOT, path, 0, &mut params, &mut match_path)?;
        Some(TrieMatch { node, params, match_path })
    }

    fn find_from<'t, 'p>(
        &'t self,
        id: NodeId,
        path: &'p str,
        cursor: usize,
        params: &mut Vec<(&'t str, &'p str)>,
        match_path: &mut Option<&'p str>,
    ) -> Option<NodeId> {
        let node = &self.nodes[id.0];

        if cursor == path.len() {
            if !node.handlers.is_empty() || node.children.is_empty() {
                return Some(id);
            }
            let star = node.children.get("*").copied()?;
            *match_path = Some(&path[cursor..]);
            return Some(star);
        }

        if cursor == 0 && path == "/" {
            if let Some(&root_marker) = node.children.get("/") {
                if let Some(found) = self.find_from(root_marker, path, 1, params, match_path) {
                    return Some(found);
                }
            }
        }

        let anchor = if path.as_bytes()[cursor] == b'/' { cursor + 1 } else { cursor };
        let (mid, cursor) = next_segment(path, anchor);

        if let Some(&child) = node.children.get(mid) {
            let mark = params.len();
            if let Some(found) = self.find_from(child, path, cursor, params, match_path) {
                return Some(found);
            }
            params.truncate(mark);
        }

        let mut captures = node.children.iter().filter(|(key, _)| key.as_str() != mid);

        let wildcard = captures.clone().find_map(|(key, &child)| match Segment::parse(key) {
            Segment::Wildcard(prefix) if mid.starts_with(prefix) => Some(child),
            _ => None,
        });
        if let Some(child) = wildcard {
            *match_path = Some(&path[anchor..]);
            return Some(child);
        }

        let (name, child) = captures.find_map(|(key, &child)| match Segment::parse(key) {
            Segment::Param(name) => Some((name, child)),
            _ => None,
        })?;
        params.push((name, mid));
        self.find_from(child, path, cursor, params, match_path)
    }

    /// Reports whether inserting `path` would give some node a second parameter child or a second
    /// wildcard child, as `(existing key, conflicting key)`.
    pub fn capture_conflict<'t, 'p>(&'t self, path: &'p str) -> Option<(&'t str, &'p str)> {
        let mut current = ROOT;
        for segment in Segments::new(path) {
            let node = &self.nodes[current.0];
            if let Some(&child) = node.children.get(segment) {
                current = child;
                continue;
            }

            // the remaining segments all land under a fresh node
            let kind = Segment::parse(segment);
            if !kind.is_param() && !kind.is_wildcard() {
                return None;
            }
            return node
                .children
                .keys()
                .find(|key| {
                    let existing = Segment::parse(key);
                    (kind.is_param() && existing.is_param()) || (kind.is_wildcard() && existing.is_wildcard())
                })
                .map(|existing| (existing.as_str(), segment));
        }
        None
    }

    /// Collects every node carrying handlers, depth first in key order, with its path relative to
    /// the root.
    ///
    /// Relative paths join segment keys with a single `/` and have no leading `/`, except for the
    /// root marker itself which yields `"/"`.
    pub fn leaves(&self) -> Vec<(String, NodeId)> {
        let mut leaves = Vec::new();
        self.collect_leaves(ROOT, String::new(), &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: NodeId, prefix: String, leaves: &mut Vec<(String, NodeId)>) {
        let node = &self.nodes[id.0];
        if !node.handlers.is_empty() {
            leaves.push((prefix.clone(), id));
        }

        let mut base = prefix;
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        for (key, &child) in &node.children {
            self.collect_leaves(child, format!("{base}{key}"), leaves);
        }
    }

    /// Logs the level-order layout of the trie
    pub fn print_tree(&self) {
        for line in self.to_string().lines() {
            tracing::info!("{line}");
        }
    }
}

/// Level-order dump of the node layout, one node per entry with its children's keys
impl Display for RouteTrie {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut queue = VecDeque::from([("<root>", ROOT)]);
        let mut level = 0;

        while !queue.is_empty() {
            let size = queue.len();
            writeln!(f, "level {level} (size {size})")?;

            for _ in 0..size {
                let Some((key, id)) = queue.pop_front() else { break };
                writeln!(f, "  node {key}")?;

                let children = &self.nodes[id.0].children;
                if children.is_empty() {
                    writeln!(f, "    no children")?;
                }
                for (child_key, &child) in children {
                    writeln!(f, "    child {child_key}")?;
                    queue.push_back((child_key.as_str(), child));
                }
            }
            level += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteTrie, TrieMatch};
    use crate::handler::handler_fn;
    use crate::Verb;
    use std::sync::Arc;

    fn trie(paths: &[&str]) -> RouteTrie {
        let mut trie = RouteTrie::new();
        for path in paths {
            let id = trie.insert(path);
            trie.handlers_mut(id).insert(Verb::Get, Arc::new(handler_fn(|_req, _resp| {})));
            trie.handlers_mut(id).set_route(path, None);
        }
        trie
    }

    fn registered<'t>(trie: &'t RouteTrie, found: &TrieMatch<'_, '_>) -> &'t str {
        trie.handlers(found.node).registered_path()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut trie = RouteTrie::new();
        let first = trie.insert("/users/{id}");
        let len = trie.len();

        assert_eq!(trie.insert("/users/{id}"), first);
        assert_eq!(trie.insert("/users/{id}/"), first);
        assert_eq!(trie.insert("users/{id}"), first);
        assert_eq!(trie.len(), len);
    }

    #[test]
    fn test_root_marker_is_own_node() {
        let mut trie = RouteTrie::new();
        let root = trie.insert("/");
        let a = trie.insert("/a");
        assert_ne!(root, a);
        assert_eq!(trie.insert("/"), root);
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_find_literal() {
        let trie = trie(&["/", "/users", "/users/list"]);

        let found = trie.find("/users/list").unwrap();
        assert_eq!(registered(&trie, &found), "/users/list");
        assert!(found.params.is_empty());
        assert_eq!(found.match_path, None);

        assert_eq!(registered(&trie, &trie.find("/users").unwrap()), "/users");
        assert_eq!(registered(&trie, &trie.find("/").unwrap()), "/");
        assert!(trie.find("/nope").is_none());
        assert!(trie.find("/users/list/more").is_none());
    }

    #[test]
    fn test_find_params() {
        let trie = trie(&["/users/{id}/posts/{ postId }"]);

        let found = trie.find("/users/42/posts/7").unwrap();
        assert_eq!(found.params, vec![("id", "42"), ("postId", "7")]);
        assert!(trie.find("/users/42/posts").is_none());
    }

    #[test]
    fn test_literal_beats_param() {
        let trie = trie(&["/users/{id}", "/users/me"]);

        let found = trie.find("/users/me").unwrap();
        assert_eq!(registered(&trie, &found), "/users/me");
        assert!(found.params.is_empty());

        let found = trie.find("/users/you").unwrap();
        assert_eq!(registered(&trie, &found), "/users/{id}");
        assert_eq!(found.params, vec![("id", "you")]);
    }

    #[test]
    fn test_failed_literal_branch_falls_back_to_param() {
        let trie = trie(&["/a/b/c", "/a/{x}/d"]);

        let found = trie.find("/a/b/d").unwrap();
        assert_eq!(registered(&trie, &found), "/a/{x}/d");
        assert_eq!(found.params, vec![("x", "b")]);
    }

    #[test]
    fn test_failed_branch_drops_its_bindings() {
        let trie = trie(&["/a/{x}/c", "/{y}/b/d"]);

        let found = trie.find("/a/b/d").unwrap();
        assert_eq!(registered(&trie, &found), "/{y}/b/d");
        assert_eq!(found.params, vec![("y", "a")]);
    }

    #[test]
    fn test_wildcard_captures_rest_of_path() {
        let trie = trie(&["/static/*"]);

        let found = trie.find("/static/css/app.css").unwrap();
        assert_eq!(registered(&trie, &found), "/static/*");
        assert_eq!(found.match_path, Some("css/app.css"));
    }

    #[test]
    fn test_prefixed_wildcard() {
        let trie = trie(&["/files/img*"]);

        let found = trie.find("/files/img01.png").unwrap();
        assert_eq!(found.match_path, Some("img01.png"));
        assert!(trie.find("/files/doc.txt").is_none());
    }

    #[test]
    fn test_wildcard_beats_param() {
        let trie = trie(&["/files/{name}", "/files/img*"]);

        let found = trie.find("/files/img1/x").unwrap();
        assert_eq!(registered(&trie, &found), "/files/img*");

        let found = trie.find("/files/doc").unwrap();
        assert_eq!(registered(&trie, &found), "/files/{name}");
    }

    #[test]
    fn test_bare_wildcard_at_end_of_path() {
        let trie = trie(&["/static/*"]);

        let found = trie.find("/static").unwrap();
        assert_eq!(registered(&trie, &found), "/static/*");
        assert_eq!(found.match_path, Some(""));
    }

    #[test]
    fn test_inner_node_without_handlers_is_no_match() {
        let trie = trie(&["/a/b"]);
        assert!(trie.find("/a").is_none());
    }

    #[test]
    fn test_endpoint_and_prefix() {
        let trie = trie(&["/a", "/a/b"]);
        assert_eq!(registered(&trie, &trie.find("/a").unwrap()), "/a");
        assert_eq!(registered(&trie, &trie.find("/a/b").unwrap()), "/a/b");
    }

    #[test]
    fn test_capture_conflict() {
        let trie = trie(&["/users/{id}", "/files/img*", "/files/{name}"]);

        assert_eq!(trie.capture_conflict("/users/{user_id}/posts"), Some(("{id}", "{user_id}")));
        assert_eq!(trie.capture_conflict("/files/doc*"), Some(("img*", "doc*")));
        assert_eq!(trie.capture_conflict("/users/{id}/posts"), None);
        assert_eq!(trie.capture_conflict("/users/me"), None);
        assert_eq!(trie.capture_conflict("/other/{id}"), None);
    }

    #[test]
    fn test_leaves() {
        let trie = trie(&["/", "/a", "/a/b/{id}", "/c/*"]);
        let leaves = trie.leaves().into_iter().map(|(path, _)| path).collect::<Vec<_>>();
        assert_eq!(leaves, vec!["/", "a", "a/b/{id}", "c/*"]);
    }

    #[test]
    fn test_display() {
        let trie = trie(&["/", "/a/b"]);
        let dump = trie.to_string();
        let expected = "level 0 (size 1)\n  node <root>\n    child /\n    child a\n\
                        level 1 (size 2)\n  node /\n    no children\n  node a\n    child b\n\
                        level 2 (size 1)\n  node b\n    no children\n";
        assert_eq!(dump, expected);
    }
}
