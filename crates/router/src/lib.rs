//! A segment trie HTTP path router
//!
//! This crate maps registered path patterns and HTTP verbs to handlers and resolves incoming request
//! paths to exactly one of them. It does not parse requests or own a server loop, the protocol layer
//! hands it an already parsed request and schedules whatever follow-up work a handler returns.
//!
//! # Features
//!
//! - Literal, named parameter (`{id}`) and wildcard (`*`, `img*`) segments
//! - Deterministic priority: literal, then wildcard, then parameter
//! - Per-verb handlers with an `ANY` fallback
//! - Duplicate registration rejection
//! - Mounting a route group under a URL prefix
//! - Before/after aspects, router-wide and per route
//! - An immutable, shareable router once setup is done
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use micro_router::{handler_fn, RequestContext, Router, RouterBuilder};
//!
//! let mut api = RouterBuilder::new();
//! api.get("/health", handler_fn(|_req, resp| *resp.body_mut() = Bytes::from_static(b"ok"))).unwrap();
//!
//! let mut builder = Router::builder();
//! builder
//!     .get("/static/*", handler_fn(|req, resp| {
//!         *resp.body_mut() = Bytes::from(req.match_path().unwrap_or_default().to_owned());
//!     }))
//!     .unwrap()
//!     .mount(&api, "/api/v1")
//!     .unwrap();
//! let router = builder.build();
//!
//! let mut req = RequestContext::from(Request::builder().uri("/api/v1/health").body(Bytes::new()).unwrap());
//! let mut resp = Response::new(Bytes::new());
//! router.dispatch(&mut req, &mut resp).unwrap();
//! assert_eq!(resp.body().as_ref(), b"ok");
//!
//! let mut req = RequestContext::from(Request::builder().uri("/static/css/app.css").body(Bytes::new()).unwrap());
//! let mut resp = Response::new(Bytes::new());
//! router.dispatch(&mut req, &mut resp).unwrap();
//! assert_eq!(resp.body().as_ref(), b"css/app.css");
//! ```

mod error;
mod request;
mod verb;

pub mod aspect;
pub mod handler;
pub mod route_index;
pub mod router;
pub mod trie;

pub use aspect::Aspect;
pub use aspect::Aspects;
pub use error::RouteError;
pub use error::RouteResult;
pub use handler::handler_fn;
pub use handler::series_fn;
pub use handler::FollowUp;
pub use handler::Handler;
pub use request::PathParams;
pub use request::RequestContext;
pub use route_index::RouteEntry;
pub use router::RouteMatch;
pub use router::Router;
pub use router::RouterBuilder;
pub use verb::Verb;
