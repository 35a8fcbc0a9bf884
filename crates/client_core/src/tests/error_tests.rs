use super::*;

#[test]
fn not_found_uses_resource_name() {
    let err = ClientError::from_status(StatusCode::NOT_FOUND, "product 9", "");
    assert!(matches!(err, ClientError::NotFound(ref what) if what == "product 9"));
    assert_eq!(err.to_string(), "product 9 not found");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[test]
fn client_errors_become_validation_with_field_detail() {
    let body = r#"{"message":"invalid product","errors":[{"field":"price","message":"must be >= 0"}]}"#;
    let err = ClientError::from_status(StatusCode::BAD_REQUEST, "product", body);

    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(err.field_errors(), &[FieldError::new("price", "must be >= 0")]);
    assert_eq!(err.to_string(), "request rejected (400): invalid product");
    assert!(!err.is_transient());
}

#[test]
fn long_non_json_bodies_fall_back_to_reason_phrase() {
    let html = format!("<html>{}</html>", "x".repeat(400));
    let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "product page", &html);

    assert!(matches!(
        err,
        ClientError::Server { status: 502, ref message } if message == "Bad Gateway"
    ));
    assert!(err.is_transient());
}

#[test]
fn json_body_without_text_uses_reason_phrase() {
    let err = ClientError::from_status(StatusCode::CONFLICT, "product", "{}");
    assert_eq!(err.to_string(), "request rejected (409): Conflict");
}

#[test]
fn only_gateway_style_server_errors_are_transient() {
    for (status, transient) in [(500, false), (501, false), (502, true), (503, true), (504, true)] {
        let err = ClientError::Server {
            status,
            message: String::new(),
        };
        assert_eq!(err.is_transient(), transient, "status {status}");
    }
    assert!(!ClientError::Decode("bad json".into()).is_transient());
    assert!(!ClientError::NotFound("product 1".into()).is_transient());
}

#[test]
fn page_decode_errors_convert_to_decode() {
    let err: ClientError = PageDecodeError::MissingTotal(shared::protocol::PageShape::Nested).into();
    assert_eq!(err.code(), ErrorCode::Decode);
}
