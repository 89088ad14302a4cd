use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{entities::token::Claims, errors::AuthError};

/// Claims of the signed-in member, placed in the request by the auth middleware.
/// Rejects with 401 when absent.
#[derive(Debug)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        self.0.user_id()
    }
}

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthClaims(claims.clone()))),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}

/// Claims of a Director of Operations.
/// 401 when not signed in, 403 for regular members.
#[derive(Debug)]
pub struct DirectorClaims(pub Claims);

impl DirectorClaims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        self.0.user_id()
    }
}

impl FromRequest for DirectorClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) if claims.director => ready(Ok(DirectorClaims(claims.clone()))),
            Some(_) => ready(Err(
                AuthError::Forbidden("Director access required".into()).into(),
            )),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}
