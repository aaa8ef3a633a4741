/// PUT /posts/{id} ハンドラー
///
/// 既存記事のtitle/content/authorを上書きし、updatedAtを更新する。
use blog_posts::application::{run_operation, PostOperation};
use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run_operation(PostOperation::Update).await
}
