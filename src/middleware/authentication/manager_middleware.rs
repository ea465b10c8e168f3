use crate::middleware::authentication::*;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    Error, HttpMessage,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

pub struct ManagerMiddleware<S> {
    pub service: Rc<RefCell<S>>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl<S, B> Service<ServiceRequest> for ManagerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = S::Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if let Ok(mut service) = self.service.try_borrow_mut() {
            service.poll_ready(ctx)
        } else {
            Poll::Pending
        }
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verifier = self.verifier.clone();
        async move {
            // rejected before any handler runs
            let admin = method::try_basic(&req, verifier.as_ref())?;
            if req.extensions_mut().insert(Arc::new(admin)).is_some() {
                tracing::error!("admin guard already called once");
            }

            let fut = service.borrow_mut().call(req);
            fut.await
        }
        .boxed_local()
    }
}
