// CORS検証とレスポンス生成ヘルパー
//
// 全操作で共通のCORSヘッダーを付与したJSONレスポンスを構築する。

use lambda_http::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Response};
use serde::Serialize;
use tracing::warn;

/// CORSアクセスを許可するOrigin
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://blog.jungyu.store"];

/// Access-Control-Allow-Methodsの値
pub const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// Access-Control-Allow-Headersの値
pub const ALLOWED_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";

/// エラーレスポンスのボディ
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// リクエストのOriginを許可リストと照合する
///
/// 大文字小文字を区別せず一致すれば入力をそのまま返し、
/// 一致しなければ空文字列を返す。
pub fn validate_origin(origin: &str) -> String {
    if ALLOWED_ORIGINS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(origin))
    {
        return origin.to_string();
    }

    warn!(origin = origin, "許可されていないOriginからのリクエスト");
    String::new()
}

/// CORSヘッダーを生成
///
/// `origin`は`validate_origin`の結果を渡す（空文字列可）。
pub fn build_cors_headers(origin: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );

    headers
}

/// CORSヘッダー付きのレスポンスを構築する
pub fn build_response(status: StatusCode, body: Body, origin: &str) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = build_cors_headers(origin);
    response
}

/// `{"message": "..."}`形式のエラーレスポンスを構築する
pub fn build_error_response(status: StatusCode, message: &str, origin: &str) -> Response<Body> {
    let body = serde_json::to_string(&ErrorBody { message })
        .unwrap_or_else(|_| r#"{"message":"Internal server error"}"#.to_string());
    build_response(status, Body::Text(body), origin)
}
