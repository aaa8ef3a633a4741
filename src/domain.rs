// ドメイン層モジュール
pub mod post;

// 再エクスポート
pub use post::{format_timestamp, require_post_id, Post, PostInput, PostValidationError};
