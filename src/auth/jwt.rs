use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Claims of an access token issued by the external auth provider
/// (HS256, shared secret). Only `sub` and `exp` are relied upon.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
pub(crate) fn create_test_token(user_id: Uuid, ttl_secs: i64, config: &Config) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: Some(now.timestamp()),
        email: Some("dreamer@example.com".into()),
        role: Some("authenticated".into()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let config = Config::for_tests();
        let user = Uuid::new_v4();
        let token = create_test_token(user, 3600, &config);
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user);
        assert_eq!(data.claims.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = Config::for_tests();
        let token = create_test_token(Uuid::new_v4(), -3600, &config);
        assert!(matches!(verify_token(&token, &config), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = Config::for_tests();
        let token = create_test_token(Uuid::new_v4(), 3600, &config);
        let other = Config {
            jwt_secret: "another-secret".into(),
            ..Config::for_tests()
        };
        assert!(verify_token(&token, &other).is_err());
    }
}
