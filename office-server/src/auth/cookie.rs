//! Signed auth cookie
//!
//! The cookie value is `<jwt>.<hex HMAC-SHA256(cookie_secret, jwt)>`.

use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_COOKIE: &str = "token";

fn mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    HmacSha256::new_from_slice(secret.as_bytes()).unwrap_or_else(|_| unreachable!())
}

/// Append the signature to a token
pub fn sign(secret: &str, token: &str) -> String {
    let mut mac = mac(secret);
    mac.update(token.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("{token}.{signature}")
}

/// Verify a signed value and return the inner token
pub fn verify<'a>(secret: &str, value: &'a str) -> Option<&'a str> {
    let (token, signature) = value.rsplit_once('.')?;
    let expected = hex::decode(signature).ok()?;
    let mut mac = mac(secret);
    mac.update(token.as_bytes());
    mac.verify_slice(&expected).ok()?;
    Some(token)
}

/// Read a cookie by name from the `Cookie` header(s)
pub fn read<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// `Set-Cookie` value carrying a signed token
pub fn build(value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{AUTH_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the auth cookie
pub fn clear() -> String {
    format!("{AUTH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn signed_value_verifies_and_tampering_fails() {
        let signed = sign("cookie-secret", "aaa.bbb.ccc");
        assert_eq!(verify("cookie-secret", &signed), Some("aaa.bbb.ccc"));
        assert_eq!(verify("other-secret", &signed), None);

        let tampered = signed.replacen("aaa", "aab", 1);
        assert_eq!(verify("cookie-secret", &tampered), None);
        assert_eq!(verify("cookie-secret", "no-signature"), None);
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def; lang=en"),
        );
        assert_eq!(read(&headers, "token"), Some("abc.def"));
        assert_eq!(read(&headers, "missing"), None);
    }

    #[test]
    fn secure_flag_only_when_requested() {
        assert!(build("v", 60, true).ends_with("; Secure"));
        assert!(!build("v", 60, false).contains("Secure"));
        assert!(clear().contains("Max-Age=0"));
    }
}
