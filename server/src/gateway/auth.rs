use axum::http::{HeaderMap, header::AUTHORIZATION};

use super::GatewayError;

/// `Authorization: Bearer <token>` must carry exactly `expected`.
pub fn require_token(expected: &str, headers: &HeaderMap) -> Result<(), GatewayError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(GatewayError::MissingBearerToken)?;

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        return Err(GatewayError::InvalidToken);
    }

    Ok(())
}

/// Visits every byte of equal-length inputs no matter where they differ.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0u8, |diff, (left, right)| diff | (left ^ right))
        == 0
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

    use crate::gateway::{
        GatewayError,
        auth::{constant_time_eq, require_token},
    };

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_require_token() {
        assert!(require_token("secret", &headers("Bearer secret")).is_ok());
        assert!(require_token("secret", &headers("Bearer  secret ")).is_ok());

        assert!(matches!(
            require_token("secret", &HeaderMap::new()),
            Err(GatewayError::MissingBearerToken)
        ));
        assert!(matches!(
            require_token("secret", &headers("Basic c2VjcmV0")),
            Err(GatewayError::MissingBearerToken)
        ));
        assert!(matches!(
            require_token("secret", &headers("bearer secret")),
            Err(GatewayError::MissingBearerToken)
        ));
        assert!(matches!(
            require_token("secret", &headers("Bearer wrong")),
            Err(GatewayError::InvalidToken)
        ));
        assert!(matches!(
            require_token("secret", &headers("Bearer ")),
            Err(GatewayError::InvalidToken)
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"Secret"));
        assert!(!constant_time_eq(b"secret", b"secrets"));
        assert!(!constant_time_eq(b"secret", b""));
    }

    #[test]
    fn test_prefix_of_token_is_rejected() {
        assert!(matches!(
            require_token("secret", &headers("Bearer secre")),
            Err(GatewayError::InvalidToken)
        ));
        assert!(matches!(
            require_token("secret", &headers("Bearer secretsecret")),
            Err(GatewayError::InvalidToken)
        ));
    }
}
