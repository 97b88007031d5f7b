use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Headers that authenticate a private v4 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub key: String,
    pub timestamp: String,
    pub sign: String,
}

/// Sign a request the way Gate v4 expects:
/// `HMAC-SHA512(secret, METHOD\nPATH\nQUERY\nhex(SHA512(body))\nTIMESTAMP)`.
///
/// `path` is the full URL path including the `/api/v4` prefix and `query`
/// is the raw query string without the leading `?`.
pub fn sign_request(
    key: &str,
    secret: &str,
    method: &str,
    path: &str,
    query: &str,
    body: &str,
    timestamp: i64,
) -> SignedHeaders {
    let body_hash = hex::encode(Sha512::digest(body.as_bytes()));
    let payload = format!("{method}\n{path}\n{query}\n{body_hash}\n{timestamp}");

    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(payload.as_bytes());

    SignedHeaders {
        key: key.to_string(),
        timestamp: timestamp.to_string(),
        sign: hex::encode(mac.finalize().into_bytes()),
    }
}
