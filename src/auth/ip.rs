//! Client IP extraction.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};

/// Extract the client IP for a request.
///
/// With `trust_forwarded_for`, the first address in `X-Forwarded-For` wins and
/// the socket address is only a fallback. Otherwise only the socket address
/// from `ConnectInfo` is used.
pub fn extract_client_ip(request: &Request, trust_forwarded_for: bool) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(forwarded: Option<&str>, socket: Option<[u8; 4]>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        if let Some(ip) = socket {
            builder = builder.extension(ConnectInfo(SocketAddr::from((ip, 4000))));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_socket_address_used_by_default() {
        let req = request(Some("10.0.0.1"), Some([127, 0, 0, 1]));
        assert_eq!(extract_client_ip(&req, false).as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_forwarded_for_first_hop_when_trusted() {
        let req = request(Some(" 10.0.0.1 , 172.16.0.1"), Some([127, 0, 0, 1]));
        assert_eq!(extract_client_ip(&req, true).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_falls_back_to_socket_when_header_missing() {
        let req = request(None, Some([192, 168, 1, 5]));
        assert_eq!(extract_client_ip(&req, true).as_deref(), Some("192.168.1.5"));
    }

    #[test]
    fn test_no_ip_available() {
        let req = request(None, None);
        assert_eq!(extract_client_ip(&req, true), None);
    }
}
