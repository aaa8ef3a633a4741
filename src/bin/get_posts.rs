/// GET /posts ハンドラー
///
/// 記事テーブルを全件スキャンし、作成日時の新しい順で返却する。
use blog_posts::application::{run_operation, PostOperation};
use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run_operation(PostOperation::List).await
}
