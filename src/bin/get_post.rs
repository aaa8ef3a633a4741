/// GET /posts/{id} ハンドラー
///
/// パスパラメータのIDで記事を1件取得する。
use blog_posts::application::{run_operation, PostOperation};
use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run_operation(PostOperation::Get).await
}
