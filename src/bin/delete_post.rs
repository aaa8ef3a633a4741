/// DELETE /posts/{id} ハンドラー
///
/// 記事を削除する。存在しない記事の削除も成功として扱う。
use blog_posts::application::{run_operation, PostOperation};
use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run_operation(PostOperation::Delete).await
}
