use actix_web::HttpRequest;

/// Client address as the server sees it: first hop of `X-Forwarded-For`
/// when a proxy set it, otherwise the TCP peer address. Both are spoofable
/// or NAT-shared, so consumers treat the result as an advisory signal, not
/// a security boundary.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_header_wins_and_takes_first_hop() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
            .to_http_request();
        assert_eq!(client_ip(&req), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn falls_back_to_peer_addr() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.50:44000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req), Some("192.168.1.50".to_string()));
    }

    #[test]
    fn empty_forwarded_header_falls_through() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " "))
            .peer_addr("192.168.1.50:44000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req), Some("192.168.1.50".to_string()));
    }
}
