// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use routekit::{Body, Exception, Response};

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod construction_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_sets_defaults() {
        let response = Response::new();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers(),
            [("Content-Type".to_string(), "text/html; charset=utf-8".to_string())]
        );
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_with_parts_sets_all_fields() {
        let headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        let body = Body::Chunks(vec![r#"{"name": "routekit"}"#.to_string()]);

        let response = Response::with_parts(body, 201, headers.clone());

        assert_eq!(response.status(), 201);
        assert_eq!(response.headers(), headers);
        assert_eq!(response.body(), [r#"{"name": "routekit"}"#.to_string()]);
    }

    #[test]
    fn test_single_string_body_becomes_one_chunk() {
        let response = Response::with_parts("hello world".into(), 200, Vec::new());

        assert_eq!(response.body(), ["hello world".to_string()]);
    }

    #[test]
    fn test_unsupported_body_type_is_rejected() {
        assert_eq!(Body::try_from(json!(1)).unwrap_err(), Exception::TypeMismatch);
        assert_eq!(
            Body::try_from(json!({"a": "b"})).unwrap_err(),
            Exception::TypeMismatch
        );
        assert_eq!(Body::try_from(json!(true)).unwrap_err(), Exception::TypeMismatch);
    }
}

#[cfg(test)]
mod header_tests {
    use super::*;

    #[test]
    fn test_read_default_header() {
        let response = Response::new();

        assert_eq!(
            response.header("Content-Type"),
            Some("text/html; charset=utf-8")
        );
    }

    #[test]
    fn test_set_and_read_header() {
        let mut response = Response::new();

        response.set_header("Content-Type", "text/plain");

        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_unknown_header_is_none() {
        let response = Response::new();

        assert!(response.header("X-Missing").is_none());
    }
}

#[cfg(test)]
mod finish_tests {
    use super::*;

    #[test]
    fn test_finish_returns_status_headers_body() {
        let headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        let body = Body::Chunks(vec![r#"{"name": "routekit"}"#.to_string()]);
        let mut response = Response::with_parts(body, 200, headers);

        let (status, headers, body) = response.finish();

        assert_eq!(status, 200);
        assert_eq!(header(&headers, "Content-Type"), Some("application/json"));
        assert_eq!(body, [r#"{"name": "routekit"}"#.to_string()]);
    }

    #[test]
    fn test_finish_computes_content_length() {
        let body = Body::Text(r#"{"name": "routekit"}"#.to_string());
        let mut response = Response::with_parts(body, 200, Vec::new());

        let (_, headers, _) = response.finish();

        assert_eq!(header(&headers, "Content-Length"), Some("20"));
    }

    #[test]
    fn test_finish_computes_content_length_for_empty_body() {
        let mut response = Response::new();

        let (_, headers, _) = response.finish();

        assert_eq!(header(&headers, "Content-Length"), Some("0"));
    }

    #[test]
    fn test_finish_sums_all_chunks() {
        let mut response = Response::with_parts(
            Body::Chunks(vec!["ab".to_string(), "cd".to_string()]),
            200,
            Vec::new(),
        );

        let (_, headers, body) = response.finish();

        assert_eq!(header(&headers, "Content-Length"), Some("4"));
        assert_eq!(body, ["ab".to_string(), "cd".to_string()]);
    }
}

#[cfg(test)]
mod redirect_tests {
    use super::*;

    #[test]
    fn test_redirect_sets_location_and_302() {
        let mut response = Response::new();

        response.redirect("/hello");

        assert_eq!(response.header("Location"), Some("/hello"));
        assert_eq!(response.status(), 302);
    }

    #[test]
    fn test_redirect_with_explicit_status() {
        let mut response = Response::new();

        response.redirect_with("/hello", 301);

        assert_eq!(response.header("Location"), Some("/hello"));
        assert_eq!(response.status(), 301);
    }
}

#[cfg(test)]
mod write_tests {
    use super::*;

    #[test]
    fn test_write_appends_to_body() {
        let mut response = Response::new();

        response.write("hello world");

        assert_eq!(response.body(), ["hello world".to_string()]);
    }
}
