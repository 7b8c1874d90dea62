use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};
use futures_util::{future::LocalBoxFuture, FutureExt};
use std::rc::Rc;

use crate::{
    api::error,
    modules::{
        access::service::AccessSvc,
        account::schema::{Principal, Role},
    },
};

/// Resolves the bearer token into a Principal and stashes it in request
/// extensions. Token decode, account lookup and the suspension check all
/// happen inside the access service.
pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired").into());
        }
    };

    let access = req
        .app_data::<web::Data<AccessSvc>>()
        .ok_or_else(|| error::Error::internal_server_error())?;

    let principal = access.authenticate(token).await.map_err(error::Error::from)?;

    req.extensions_mut().insert(principal);

    next.call(req).await
}

pub fn get_principal(req: &HttpRequest) -> Result<Principal, error::Error> {
    let extensions = req.extensions();

    let principal = extensions
        .get::<Principal>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?;

    Ok(*principal)
}

pub fn authorization<B>(
    allowed_roles: Vec<Role>,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    let allowed_roles = Rc::new(allowed_roles);
    move |req: ServiceRequest, next: Next<B>| {
        let roles = allowed_roles.clone();
        async move {
            let role = get_principal(req.request())?.role;

            if !roles.contains(&role) {
                return Err(error::Error::forbidden("No permission").into());
            }
            next.call(req).await
        }
        .boxed_local()
    }
}
