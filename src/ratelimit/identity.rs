//! Caller identity extraction from HTTP request data.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Proxy headers consulted for the caller identity, in priority order.
pub const DEFAULT_TRUSTED_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Determine the identity a request is rate limited under.
///
/// Headers are consulted in the order given; the first one carrying a
/// non-empty value wins. `X-Forwarded-For` style chains are reduced to
/// their first (client-most) element. When no trusted header is present
/// the peer address decides, with the port stripped so one client is not
/// a fresh identity per connection.
///
/// These headers are client-supplied. Behind a proxy that rewrites them
/// this yields the real client address; exposed directly to the internet
/// a caller can present an arbitrary identity and dodge or pollute
/// another caller's counter. Deploy accordingly.
pub fn client_identity(headers: &HeaderMap, trusted_headers: &[String], peer: SocketAddr) -> String {
    for name in trusted_headers {
        let value = match headers.get(name.as_str()).and_then(|v| v.to_str().ok()) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        let candidate = value.split(',').next().unwrap_or("").trim();
        if !candidate.is_empty() {
            return candidate.to_string();
        }
    }
    peer.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn trusted() -> Vec<String> {
        DEFAULT_TRUSTED_HEADERS
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn peer() -> SocketAddr {
        "203.0.113.9:51423".parse().unwrap()
    }

    #[test]
    fn test_forwarded_for_takes_priority() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.1"));

        assert_eq!(
            client_identity(&headers, &trusted(), peer()),
            "198.51.100.7"
        );
    }

    #[test]
    fn test_forwarded_chain_uses_first_element() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.7, 10.0.0.1, 10.0.0.2"),
        );

        assert_eq!(
            client_identity(&headers, &trusted(), peer()),
            "198.51.100.7"
        );
    }

    #[test]
    fn test_value_whitespace_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-real-ip",
            HeaderValue::from_static("  192.0.2.1  "),
        );

        assert_eq!(client_identity(&headers, &trusted(), peer()), "192.0.2.1");
    }

    #[test]
    fn test_empty_header_falls_through_to_next() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        headers.insert("cf-connecting-ip", HeaderValue::from_static("192.0.2.1"));

        assert_eq!(client_identity(&headers, &trusted(), peer()), "192.0.2.1");
    }

    #[test]
    fn test_blank_chain_falls_through_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" , ,"));

        assert_eq!(client_identity(&headers, &trusted(), peer()), "203.0.113.9");
    }

    #[test]
    fn test_peer_port_is_stripped() {
        let headers = HeaderMap::new();

        assert_eq!(client_identity(&headers, &trusted(), peer()), "203.0.113.9");
    }

    #[test]
    fn test_ipv6_peer_address() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "[2001:db8::1]:443".parse().unwrap();

        assert_eq!(client_identity(&headers, &trusted(), peer), "2001:db8::1");
    }

    #[test]
    fn test_header_order_is_configurable() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.1"));

        let reversed = vec!["x-real-ip".to_string(), "x-forwarded-for".to_string()];
        assert_eq!(client_identity(&headers, &reversed, peer()), "192.0.2.1");
    }
}
