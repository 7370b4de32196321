//! SASL mechanism plumbing for `AUTHENTICATE`.
//!
//! The engine only needs the pure computation of a mechanism: given the
//! decoded challenge bytes, produce the response bytes. Transport framing
//! (base64 transcoding, continuation handling) lives in
//! [`Client::authenticate`](crate::Client::authenticate); negotiation policy
//! is the caller's business.

/// Computes the client response to a server challenge for one SASL
/// mechanism.
pub trait Authenticator {
    type Response: AsRef<[u8]>;

    /// Derive the response to send for the given (already base64-decoded)
    /// challenge.
    fn process(&self, challenge: &[u8]) -> Self::Response;
}

impl<T: Authenticator> Authenticator for &T {
    type Response = T::Response;

    fn process(&self, challenge: &[u8]) -> Self::Response {
        (*self).process(challenge)
    }
}

/// The `PLAIN` mechanism of [RFC 4616](https://tools.ietf.org/html/rfc4616):
/// authorization, user and password joined with NUL bytes.
pub struct Plain {
    pub user: String,
    pub password: String,
}

impl Authenticator for Plain {
    type Response = Vec<u8>;

    fn process(&self, _challenge: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.user.len() + self.password.len() + 2);
        out.push(0);
        out.extend_from_slice(self.user.as_bytes());
        out.push(0);
        out.extend_from_slice(self.password.as_bytes());
        out
    }
}

/// The `XOAUTH2` mechanism used by GMail and Outlook: a fixed-format string
/// carrying the user and an OAuth2 bearer token.
pub struct Xoauth2 {
    pub user: String,
    pub access_token: String,
}

impl Authenticator for Xoauth2 {
    type Response = String;

    fn process(&self, _challenge: &[u8]) -> String {
        format!(
            "user={}\x01auth=Bearer {}\x01\x01",
            self.user, self.access_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_response() {
        let auth = Plain {
            user: "tim".to_string(),
            password: "tanstaaftanstaaf".to_string(),
        };
        assert_eq!(auth.process(b""), b"\0tim\0tanstaaftanstaaf".to_vec());
    }

    #[test]
    fn xoauth2_response() {
        let auth = Xoauth2 {
            user: "someuser@example.com".to_string(),
            access_token: "ya29.vF9dft4qmTc2Nvb3RlckBhdHRhdmlzdGEuY29tCg".to_string(),
        };
        assert_eq!(
            auth.process(b""),
            "user=someuser@example.com\x01auth=Bearer \
             ya29.vF9dft4qmTc2Nvb3RlckBhdHRhdmlzdGEuY29tCg\x01\x01"
        );
    }
}
