//! The handler abstraction stored in the routing tree.
//!
//! The router only stores and calls [`Handler`]s, it never needs to know their concrete shape. A handler
//! produces the response synchronously and may hand back a [`FollowUp`], a unit of asynchronous work the
//! server's scheduler runs after the handler returns.

use crate::RequestContext;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::Response;
use std::fmt::{Debug, Formatter};

/// Asynchronous work produced by a handler, to be run by the server's scheduler
pub type FollowUp = BoxFuture<'static, ()>;

#[cfg_attr(test, mockall::automock)]
pub trait Handler: Send + Sync {
    fn invoke(&self, req: &RequestContext, resp: &mut Response<Bytes>) -> Option<FollowUp>;
}

/// A [`Handler`] backed by a plain closure that never schedules follow-up work
pub struct FnHandler<F> {
    f: F,
}

/// A [`Handler`] backed by a closure that may schedule follow-up work
pub struct SeriesHandler<F> {
    f: F,
}

/// Creates a handler from a closure that writes the response in place
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&RequestContext, &mut Response<Bytes>) + Send + Sync,
{
    FnHandler { f }
}

/// Creates a handler from a closure that may return a [`FollowUp`]
pub fn series_fn<F>(f: F) -> SeriesHandler<F>
where
    F: Fn(&RequestContext, &mut Response<Bytes>) -> Option<FollowUp> + Send + Sync,
{
    SeriesHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&RequestContext, &mut Response<Bytes>) + Send + Sync,
{
    fn invoke(&self, req: &RequestContext, resp: &mut Response<Bytes>) -> Option<FollowUp> {
        (self.f)(req, resp);
        None
    }
}

impl<F> Handler for SeriesHandler<F>
where
    F: Fn(&RequestContext, &mut Response<Bytes>) -> Option<FollowUp> + Send + Sync,
{
    fn invoke(&self, req: &RequestContext, resp: &mut Response<Bytes>) -> Option<FollowUp> {
        (self.f)(req, resp)
    }
}

impl<F> Debug for FnHandler<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnHandler")
    }
}

impl<F> Debug for SeriesHandler<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SeriesHandler")
    }
}

#[cfg(test)]
mod tests {
    use super::{handler_fn, series_fn, FollowUp, Handler};
    use crate::RequestContext;
    use bytes::Bytes;
    use http::{Request, Response, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn assert_is_handler<T: Handler>(_handler: &T) {
        // no op
    }

    fn request() -> RequestContext {
        Request::builder().uri("/").body(Bytes::new()).unwrap().into()
    }

    #[test]
    fn test_handler_fn_writes_response() {
        let handler = handler_fn(|_req, resp| {
            *resp.status_mut() = StatusCode::CREATED;
            *resp.body_mut() = Bytes::from_static(b"created");
        });
        assert_is_handler(&handler);

        let mut resp = Response::new(Bytes::new());
        let follow_up = handler.invoke(&request(), &mut resp);

        assert!(follow_up.is_none());
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.body().as_ref(), b"created");
    }

    #[tokio::test]
    async fn test_series_fn_returns_follow_up() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = Arc::clone(&counter);
        let handler = series_fn(move |_req, _resp| {
            let counter = Arc::clone(&task_counter);
            let task: FollowUp = Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            Some(task)
        });
        assert_is_handler(&handler);

        let mut resp = Response::new(Bytes::new());
        let follow_up = handler.invoke(&request(), &mut resp).expect("follow up should be scheduled");
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        follow_up.await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
