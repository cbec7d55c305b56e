//! Dispatch of commands and queries to their handlers.
//!
//! Every request type is registered with exactly one handler when the
//! [`Mediator`] is built. Dispatch is a lookup keyed by the request's type.

use crate::operation::{Error, ErrorCode, OperationResult};
use async_trait::async_trait;
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::Arc,
};
use tracing::{debug, error, warn};

/// A command or query, naming the payload its handler produces.
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> OperationResult<R::Response>;
}

type ErasedHandler = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct MediatorBuilder {
    handlers: HashMap<TypeId, (&'static str, ErasedHandler)>,
}

impl MediatorBuilder {
    /// Registers the handler for `R`, replacing an earlier registration.
    #[must_use]
    pub fn register<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        let entry: (_, ErasedHandler) = (type_name::<R>(), Box::new(handler));

        if self.handlers.insert(TypeId::of::<R>(), entry).is_some() {
            warn!(request = type_name::<R>(), "Replaced an already registered handler");
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Mediator {
        Mediator {
            handlers: self.handlers,
        }
    }
}

pub struct Mediator {
    handlers: HashMap<TypeId, (&'static str, ErasedHandler)>,
}

impl Mediator {
    #[must_use]
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::default()
    }

    #[cfg(test)]
    fn handles<R: Request>(&self) -> bool {
        self.handler::<R>().is_some()
    }

    fn handler<R: Request>(&self) -> Option<Arc<dyn RequestHandler<R>>> {
        self.handlers
            .get(&TypeId::of::<R>())
            .and_then(|(_, handler)| handler.downcast_ref::<Arc<dyn RequestHandler<R>>>())
            .cloned()
    }

    pub async fn send<R: Request>(&self, request: R) -> OperationResult<R::Response> {
        let Some(handler) = self.handler::<R>() else {
            error!(request = type_name::<R>(), "No handler registered");
            return OperationResult::failure(Error::new(
                ErrorCode::UnknownError,
                format!("No handler registered for {}", type_name::<R>()),
            ));
        };

        debug!(request = type_name::<R>(), "Dispatching request");
        handler.handle(request).await
    }
}

impl Debug for Mediator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut requests: Vec<_> = self.handlers.values().map(|(name, _)| *name).collect();
        requests.sort_unstable();
        f.debug_struct("Mediator")
            .field("requests", &requests)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        mediator::{Mediator, Request, RequestHandler},
        operation::{Error, ErrorCode, OperationResult},
    };
    use async_trait::async_trait;

    struct Echo(String);

    impl Request for Echo {
        type Response = String;
    }

    struct Fail;

    impl Request for Fail {
        type Response = ();
    }

    struct EchoHandler {
        prefix: &'static str,
    }

    #[async_trait]
    impl RequestHandler<Echo> for EchoHandler {
        async fn handle(&self, request: Echo) -> OperationResult<String> {
            OperationResult::success(format!("{}{}", self.prefix, request.0))
        }
    }

    struct FailHandler;

    #[async_trait]
    impl RequestHandler<Fail> for FailHandler {
        async fn handle(&self, _request: Fail) -> OperationResult<()> {
            OperationResult::failure(Error::not_found("nothing here"))
        }
    }

    #[tokio::test]
    async fn routes_each_request_to_its_handler() {
        let mediator = Mediator::builder()
            .register::<Echo, _>(EchoHandler { prefix: "echo: " })
            .register::<Fail, _>(FailHandler)
            .build();

        assert!(mediator.handles::<Echo>());
        assert_eq!(
            mediator.send(Echo("hi".to_owned())).await.into_result(),
            Ok("echo: hi".to_owned())
        );

        let failed = mediator.send(Fail).await;
        assert_eq!(failed.errors()[0].code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn later_registration_wins() {
        let mediator = Mediator::builder()
            .register::<Echo, _>(EchoHandler { prefix: "first " })
            .register::<Echo, _>(EchoHandler { prefix: "second " })
            .build();

        assert_eq!(
            mediator.send(Echo("x".to_owned())).await.into_result(),
            Ok("second x".to_owned())
        );
    }

    #[tokio::test]
    async fn unregistered_request_is_an_unknown_error() {
        let mediator = Mediator::builder()
            .register::<Echo, _>(EchoHandler { prefix: "" })
            .build();

        assert!(!mediator.handles::<Fail>());
        let result = mediator.send(Fail).await;
        assert!(result.is_error());
        assert_eq!(result.errors()[0].code, ErrorCode::UnknownError);
    }
}
