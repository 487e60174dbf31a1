//! Signed token encoding/decoding (compact JWS, HMAC).
//!
//! The codec is pure mechanics: it seals and verifies. It does not decide
//! whether a correctly signed but expired token is acceptable; that policy
//! lives in the authenticator.

use std::str::FromStr;
use std::time::Duration;

use chrono::{SubsecRound, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use bookly_core::TokenId;

use crate::config::{AuthConfig, SigningSecret};
use crate::{SubjectClaims, TokenClaims, TokenKind};

/// Symmetric signing algorithms the codec accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl SigningAlgorithm {
    fn to_jwt(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Hs384 => Algorithm::HS384,
            Self::Hs512 => Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(format!("unsupported signing algorithm '{other}'")),
        }
    }
}

impl core::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bad signature, wrong algorithm, corrupt structure, undecodable claims.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token ttl must be at least one second")]
    InvalidTtl,

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// A freshly minted token together with the claims sealed inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken<S = SubjectClaims> {
    pub token: String,
    pub claims: TokenClaims<S>,
}

/// Process-wide token codec. Built once at startup, then shared read-only.
pub struct TokenCodec {
    algorithm: SigningAlgorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &SigningSecret, algorithm: SigningAlgorithm) -> Self {
        let mut validation = Validation::new(algorithm.to_jwt());
        // Expiry is checked by callers, see module docs.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret.expose()),
            decoding: DecodingKey::from_secret(secret.expose()),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.signing_secret, config.algorithm)
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Seal `subject` into a new token of the given kind, valid for `ttl`.
    ///
    /// `iat` is now (truncated to whole seconds, the wire precision) and
    /// `exp = iat + ttl`. Sub-second parts of `ttl` are dropped.
    pub fn encode<S>(&self, subject: S, kind: TokenKind, ttl: Duration) -> Result<IssuedToken<S>, CodecError>
    where
        S: Serialize,
    {
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| CodecError::InvalidTtl)?;
        if ttl_secs == 0 {
            return Err(CodecError::InvalidTtl);
        }

        let iat = Utc::now().trunc_subsecs(0);
        let exp = chrono::Duration::try_seconds(ttl_secs)
            .and_then(|ttl| iat.checked_add_signed(ttl))
            .ok_or(CodecError::InvalidTtl)?;

        let claims = TokenClaims {
            user: subject,
            jti: TokenId::generate(),
            iat,
            exp,
            refresh: kind.is_refresh(),
        };

        let token = jsonwebtoken::encode(&Header::new(self.algorithm.to_jwt()), &claims, &self.encoding)
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify the signature and decode the claims. Expired tokens decode fine.
    pub fn decode<S>(&self, token: &str) -> Result<TokenClaims<S>, CodecError>
    where
        S: DeserializeOwned,
    {
        jsonwebtoken::decode::<TokenClaims<S>>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| CodecError::InvalidToken(e.to_string()))
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use proptest::prelude::*;

    use bookly_core::UserId;

    use super::*;
    use crate::Role;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&SigningSecret::new(secret), SigningAlgorithm::Hs256)
    }

    fn subject(role: Option<Role>) -> SubjectClaims {
        SubjectClaims {
            user_uid: UserId::new(),
            email: "a@x.com".to_string(),
            role,
        }
    }

    #[test]
    fn round_trip_populates_id_timestamps_and_kind() {
        let codec = codec("test-secret");
        let before = Utc::now().trunc_subsecs(0);
        let issued = codec
            .encode(subject(Some(Role::USER)), TokenKind::Refresh, Duration::from_secs(900))
            .unwrap();

        let decoded: TokenClaims = codec.decode(&issued.token).unwrap();
        assert_eq!(decoded, issued.claims);
        assert!(decoded.refresh);
        assert!(decoded.iat >= before);
        assert_eq!(decoded.exp - decoded.iat, ChronoDuration::seconds(900));
    }

    #[test]
    fn each_issuance_gets_its_own_jti() {
        let codec = codec("test-secret");
        let s = subject(None);
        let a = codec.encode(s.clone(), TokenKind::Access, Duration::from_secs(60)).unwrap();
        let b = codec.encode(s, TokenKind::Access, Duration::from_secs(60)).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issued = codec("secret-a")
            .encode(subject(None), TokenKind::Access, Duration::from_secs(60))
            .unwrap();
        let err = codec("secret-b").decode::<SubjectClaims>(&issued.token).unwrap_err();
        assert!(matches!(err, CodecError::InvalidToken(_)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec("test-secret");
        let issued = codec.encode(subject(None), TokenKind::Access, Duration::from_secs(60)).unwrap();

        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let forged = codec.encode(subject(Some(Role::ADMIN)), TokenKind::Access, Duration::from_secs(60)).unwrap();
        parts[1] = forged.token.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");

        assert!(codec.decode::<SubjectClaims>(&tampered).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = codec("test-secret");
        for input in ["", "abc", "a.b.c", "....."] {
            assert!(codec.decode::<SubjectClaims>(input).is_err(), "{input:?} decoded");
        }
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let secret = SigningSecret::new("test-secret");
        let hs512 = TokenCodec::new(&secret, SigningAlgorithm::Hs512);
        let hs256 = TokenCodec::new(&secret, SigningAlgorithm::Hs256);
        let issued = hs512.encode(subject(None), TokenKind::Access, Duration::from_secs(60)).unwrap();
        assert!(hs256.decode::<SubjectClaims>(&issued.token).is_err());
    }

    #[test]
    fn expired_tokens_still_decode() {
        let codec = codec("test-secret");
        let now = Utc::now().trunc_subsecs(0);
        let claims = TokenClaims {
            user: subject(None),
            jti: TokenId::generate(),
            iat: now - ChronoDuration::hours(2),
            exp: now - ChronoDuration::hours(1),
            refresh: false,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let decoded: TokenClaims = codec.decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn zero_ttl_is_refused() {
        let codec = codec("test-secret");
        let err = codec
            .encode(subject(None), TokenKind::Access, Duration::from_millis(999))
            .unwrap_err();
        assert_eq!(err, CodecError::InvalidTtl);
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("hs384".parse::<SigningAlgorithm>(), Ok(SigningAlgorithm::Hs384));
        assert!("RS256".parse::<SigningAlgorithm>().is_err());
        assert_eq!(SigningAlgorithm::Hs512.to_string(), "HS512");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: whatever goes in comes back out, plus jti/iat/exp/refresh.
        #[test]
        fn round_trip_preserves_subject(
            email in "[a-z]{1,12}@[a-z]{1,8}\\.[a-z]{2,4}",
            role in proptest::option::of("[a-z]{1,10}"),
            refresh in any::<bool>(),
            ttl in 1u64..=(60 * 60 * 24 * 30),
        ) {
            let codec = codec("prop-secret");
            let subject = SubjectClaims {
                user_uid: UserId::new(),
                email,
                role: role.map(Role::new),
            };
            let kind = TokenKind::from_refresh_flag(refresh);

            let issued = codec.encode(subject.clone(), kind, Duration::from_secs(ttl)).unwrap();
            let decoded: TokenClaims = codec.decode(&issued.token).unwrap();

            prop_assert_eq!(&decoded.user, &subject);
            prop_assert_eq!(decoded.jti, issued.claims.jti);
            prop_assert_eq!(decoded.kind(), kind);
            prop_assert_eq!((decoded.exp - decoded.iat).num_seconds(), ttl as i64);
        }
    }
}
