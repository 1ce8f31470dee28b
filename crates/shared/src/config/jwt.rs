use crate::{abstract_trait::JwtServiceTrait, errors::ServiceError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// Token flavours issued by the marketplace auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn parse(token_type: &str) -> Option<Self> {
        match token_type {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(60),
            TokenKind::Refresh => Duration::days(7),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: usize,
    pub iat: usize,
    pub token_type: String,
}

impl Claims {
    pub fn issue(user_id: i64, kind: TokenKind) -> Self {
        let issued = Utc::now();

        Claims {
            user_id,
            exp: (issued + kind.lifetime()).timestamp() as usize,
            iat: issued.timestamp() as usize,
            token_type: kind.as_str().to_string(),
        }
    }
}

/// HS256 signer/verifier keyed by the shared secret.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub jwt_secret: String,
}

impl JwtConfig {
    pub fn new(jwt_secret: &str) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.to_string(),
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, ServiceError> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());

        decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                _ => ServiceError::Jwt(err),
            })
    }
}

impl JwtServiceTrait for JwtConfig {
    fn generate_token(&self, user_id: i64, token_type: &str) -> Result<String, ServiceError> {
        let kind = TokenKind::parse(token_type).ok_or(ServiceError::InvalidTokenType)?;
        let claims = Claims::issue(user_id, kind);

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(ServiceError::Jwt)
    }

    fn verify_token(&self, token: &str, expected_type: &str) -> Result<i64, ServiceError> {
        let claims = self.decode_claims(token)?;

        match TokenKind::parse(&claims.token_type) {
            Some(kind) if kind.as_str() == expected_type => Ok(claims.user_id),
            _ => Err(ServiceError::InvalidTokenType),
        }
    }
}
