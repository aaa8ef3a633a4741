// アプリケーション層モジュール
pub mod cors;
pub mod entrypoint;
pub mod post_api_handler;

// 再エクスポート
pub use cors::{build_error_response, build_response, validate_origin};
pub use entrypoint::{handle_request, run_operation};
pub use post_api_handler::{PostApiError, PostApiHandler, PostOperation};
