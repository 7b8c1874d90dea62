use actix_web::{web, FromRequest};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{api::error, modules::account::schema::Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypeClaims {
    RefreshToken,
    AccessToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub iat: u64,
    pub exp: u64,
    pub role: Role,
    pub _type: Option<TypeClaims>,
}

impl Claims {
    pub fn new(sub: &uuid::Uuid, role: &Role, exp: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        Claims { sub: *sub, iat: now, exp: now + exp, role: *role, _type: None }
    }

    pub fn with_type(mut self, _type: TypeClaims) -> Self {
        self._type = Some(_type);
        self
    }

    pub fn encode(&self, secret: &[u8]) -> Result<String, error::SystemError> {
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, self, &EncodingKey::from_secret(secret))?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }
}

/// Retry a storage operation once on connection-level failures. Repeated
/// failure surfaces as ServiceUnavailable, never raw storage internals.
pub async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, error::SystemError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match op().await {
        Err(e) if error::is_transient(&e) => {
            log::warn!("Transient storage error, retrying once: {:?}", e);
            op().await.map_err(Into::into)
        }
        other => other.map_err(Into::into),
    }
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedJson(model))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_roundtrip_preserves_role() {
        let secret = b"test-secret";
        let id = uuid::Uuid::now_v7();
        let claims =
            Claims::new(&id, &Role::Doctor, 900).with_type(TypeClaims::AccessToken);

        let token = claims.encode(secret).unwrap();
        let decoded = Claims::decode(&token, secret).unwrap();

        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.role, Role::Doctor);
        assert_eq!(decoded._type, Some(TypeClaims::AccessToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let secret = b"test-secret";
        let id = uuid::Uuid::now_v7();
        let mut claims = Claims::new(&id, &Role::Patient, 0);
        claims.iat -= 3600;
        claims.exp = claims.iat + 60;

        let token = claims.encode(secret).unwrap();
        assert!(Claims::decode(&token, secret).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let id = uuid::Uuid::now_v7();
        let claims = Claims::new(&id, &Role::Patient, 900);
        let token = claims.encode(b"secret-a").unwrap();
        assert!(Claims::decode(&token, b"secret-b").is_err());
    }
}
