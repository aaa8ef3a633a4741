/// POST /posts ハンドラー
///
/// リクエストボディを検証し、IDとタイムスタンプを付与した新規記事を保存する。
use blog_posts::application::{run_operation, PostOperation};
use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run_operation(PostOperation::Create).await
}
