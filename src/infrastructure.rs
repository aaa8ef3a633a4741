// インフラストラクチャ層モジュール
pub mod config;
pub mod logging;
pub mod post_repository;

// 再エクスポート
pub use config::{PostsTableConfig, PostsTableConfigError};
#[cfg(test)]
pub use logging::init_test_logging;
pub use logging::init_logging;
pub use post_repository::{
    shared_post_repository, DynamoPostRepository, PostRepository, PostRepositoryError,
};
