use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use common::PlayerId;

use crate::actor::Actor;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_PLAYER: &str = "Player";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (player id as string)
    pub role: String, // "Admin" or "Player"
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

impl Claims {
    pub fn actor(&self) -> Result<Actor> {
        let player_id: PlayerId = self
            .sub
            .parse()
            .context("Failed to parse player id from JWT claims")?;
        Ok(Actor {
            player_id,
            is_admin: self.role == ROLE_ADMIN,
        })
    }
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn generate_token(&self, player_id: PlayerId, is_admin: bool) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(24); // Token expires in 24 hours

        let claims = Claims {
            sub: player_id.to_string(),
            role: if is_admin { ROLE_ADMIN } else { ROLE_PLAYER }.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key).context("Failed to encode JWT token")
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Failed to decode JWT token")?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_token_round_trip_keeps_role() {
        let manager = JwtManager::new("test-secret");
        let player = Uuid::new_v4();

        let token = manager.generate_token(player, true).unwrap();
        let actor = manager.verify_token(&token).unwrap().actor().unwrap();
        assert_eq!(actor, Actor::admin(player));

        let token = manager.generate_token(player, false).unwrap();
        let claims = manager.verify_token(&token).unwrap();
        assert_eq!(claims.role, ROLE_PLAYER);
        assert_eq!(claims.actor().unwrap(), Actor::player(player));
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = JwtManager::new("one")
            .generate_token(Uuid::new_v4(), false)
            .unwrap();
        assert!(JwtManager::new("two").verify_token(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_has_no_actor() {
        let claims = Claims {
            sub: "42".to_string(),
            role: ROLE_ADMIN.to_string(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.actor().is_err());
    }
}
