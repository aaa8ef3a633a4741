/// Lambdaバイナリ共通のエントリポイント
///
/// 各バイナリは`run_operation`に担当する操作を渡すだけでよい。
use lambda_http::http::StatusCode;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use tracing::{error, info};

use crate::application::cors::build_error_response;
use crate::application::post_api_handler::{
    preflight_response, request_origin, PostApiHandler, PostOperation,
};
use crate::infrastructure::{init_logging, shared_post_repository};

/// ログを初期化し、指定した操作のLambdaランタイムを起動する
pub async fn run_operation(operation: PostOperation) -> Result<(), Error> {
    init_logging();

    info!(operation = %operation, "Lambda関数を初期化");

    run(service_fn(move |request: Request| handle_request(operation, request))).await
}

/// 1リクエストを処理する
///
/// 共有リポジトリの初期化に失敗した場合は500を返し、
/// 次のリクエストで再度初期化を試みる。
pub async fn handle_request(
    operation: PostOperation,
    request: Request,
) -> Result<Response<Body>, Error> {
    let origin = request_origin(&request);

    if let Some(response) = preflight_response(&request, &origin) {
        return Ok(response);
    }

    let repository = match shared_post_repository().await {
        Ok(repository) => repository,
        Err(err) => {
            error!(operation = %operation, error = %err, "記事テーブル設定読み込み失敗");
            return Ok(build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                operation.storage_failure_message(),
                &origin,
            ));
        }
    };

    let handler = PostApiHandler::new(repository.clone());
    Ok(handler.respond(operation, &request, &origin).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::POSTS_TABLE_ENV;
    use crate::infrastructure::init_test_logging;
    use lambda_http::http::Request as HttpRequest;
    use serial_test::serial;

    fn request(method: &str) -> Request {
        HttpRequest::builder()
            .method(method)
            .uri("/posts")
            .header("Origin", "https://blog.jungyu.store")
            .body(Body::Empty)
            .unwrap()
    }

    /// テーブル名が未設定なら500と操作ごとのメッセージを返す
    #[tokio::test]
    #[serial(posts_table_env)]
    async fn test_handle_request_without_table_config_returns_500() {
        init_test_logging();
        unsafe { std::env::remove_var(POSTS_TABLE_ENV) };

        let response = handle_request(PostOperation::List, request("GET")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://blog.jungyu.store"
        );
        let body = match response.body() {
            Body::Text(text) => text.clone(),
            _ => panic!("予期しないBody型"),
        };
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["message"], "Failed to retrieve posts");
    }

    /// プリフライトは設定なしでも応答できる
    #[tokio::test]
    #[serial(posts_table_env)]
    async fn test_handle_request_preflight_skips_repository() {
        init_test_logging();
        unsafe { std::env::remove_var(POSTS_TABLE_ENV) };

        let response = handle_request(PostOperation::Create, request("OPTIONS"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
