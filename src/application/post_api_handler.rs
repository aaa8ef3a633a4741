/// 記事APIの共通リクエストハンドラー
///
/// 作成・取得・一覧・更新・削除の5操作を`PostOperation`で切り替えて処理する。
/// 各Lambdaバイナリは実行する操作を選ぶだけで、検証・ストア操作・
/// レスポンス整形はすべてこのモジュールが担う。
use chrono::{DateTime, Utc};
use lambda_http::http::header::ORIGIN;
use lambda_http::http::{Method, StatusCode};
use lambda_http::{Body, Request, RequestExt, Response};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::cors::{build_error_response, build_response, validate_origin};
use crate::domain::{format_timestamp, require_post_id, Post, PostInput, PostValidationError};
use crate::infrastructure::{PostRepository, PostRepositoryError};

/// 現在時刻の取得関数
pub type Clock = fn() -> DateTime<Utc>;

/// 記事ID生成関数
pub type IdGenerator = fn() -> String;

/// パスパラメータ名（`postId`も別名として受け付ける）
const POST_ID_PARAM: &str = "id";
const POST_ID_PARAM_ALIAS: &str = "postId";

/// APIが提供する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOperation {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl PostOperation {
    /// ログ用の操作名
    pub fn name(self) -> &'static str {
        match self {
            PostOperation::Create => "create_post",
            PostOperation::Get => "get_post",
            PostOperation::List => "get_posts",
            PostOperation::Update => "update_post",
            PostOperation::Delete => "delete_post",
        }
    }

    /// ストア障害時にクライアントへ返すメッセージ
    pub fn storage_failure_message(self) -> &'static str {
        match self {
            PostOperation::Create => "Failed to create post",
            PostOperation::Get => "Failed to retrieve post",
            PostOperation::List => "Failed to retrieve posts",
            PostOperation::Update => "Failed to update post",
            PostOperation::Delete => "Failed to delete post",
        }
    }

    /// 変換失敗時にクライアントへ返すメッセージ
    pub fn serialization_failure_message(self) -> &'static str {
        match self {
            PostOperation::Create => "Failed to prepare item",
            PostOperation::Get => "Failed to process retrieved post",
            PostOperation::List => "Failed to process retrieved posts",
            PostOperation::Update => "Failed to process updated post",
            PostOperation::Delete => "Failed to process request",
        }
    }
}

impl std::fmt::Display for PostOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// リクエスト処理のエラー型
///
/// 内部の詳細はログにのみ出力し、クライアントには`public_message`を返す。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostApiError {
    /// 入力が不正（400）
    #[error("Validation error: {0}")]
    Validation(#[from] PostValidationError),

    /// 記事が存在しない（404）
    #[error("Post not found: {0}")]
    NotFound(String),

    /// ストア操作に失敗（500）
    #[error("Storage error: {0}")]
    Storage(String),

    /// シリアライズ/デシリアライズに失敗（500）
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<PostRepositoryError> for PostApiError {
    fn from(err: PostRepositoryError) -> Self {
        match err {
            PostRepositoryError::SerializationError(_) => PostApiError::Serialization(err.to_string()),
            PostRepositoryError::ReadError(_) | PostRepositoryError::WriteError(_) => {
                PostApiError::Storage(err.to_string())
            }
        }
    }
}

impl PostApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PostApiError::Validation(_) => StatusCode::BAD_REQUEST,
            PostApiError::NotFound(_) => StatusCode::NOT_FOUND,
            PostApiError::Storage(_) | PostApiError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// クライアントに返すエラーメッセージ
    pub fn public_message(&self, operation: PostOperation) -> String {
        match self {
            PostApiError::Validation(err) => err.to_string(),
            PostApiError::NotFound(_) => "Post not found".to_string(),
            PostApiError::Storage(_) => operation.storage_failure_message().to_string(),
            PostApiError::Serialization(_) => operation.serialization_failure_message().to_string(),
        }
    }
}

/// 成功時のステータスとボディ
#[derive(Debug)]
pub struct PostReply {
    pub status: StatusCode,
    pub body: Body,
}

impl PostReply {
    fn json<T: serde::Serialize>(status: StatusCode, value: &T) -> Result<Self, PostApiError> {
        let json = serde_json::to_string(value)
            .map_err(|e| PostApiError::Serialization(e.to_string()))?;
        Ok(Self {
            status,
            body: Body::Text(json),
        })
    }
}

/// リクエストのOriginヘッダーを許可リストで検証した値を返す
pub fn request_origin(request: &Request) -> String {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    validate_origin(origin)
}

/// OPTIONSプリフライトであれば204レスポンスを返す
pub fn preflight_response(request: &Request, origin: &str) -> Option<Response<Body>> {
    (request.method() == Method::OPTIONS)
        .then(|| build_response(StatusCode::NO_CONTENT, Body::Empty, origin))
}

/// 記事APIリクエストハンドラー
pub struct PostApiHandler<R>
where
    R: PostRepository,
{
    repository: R,
    clock: Clock,
    id_generator: IdGenerator,
}

impl<R> PostApiHandler<R>
where
    R: PostRepository,
{
    /// 現在時刻とUUID v4を使うハンドラーを作成
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            clock: Utc::now,
            id_generator: || Uuid::new_v4().to_string(),
        }
    }

    /// 時刻取得関数を差し替えたハンドラーを作成（テスト用）
    pub fn with_clock(repository: R, clock: Clock) -> Self {
        Self {
            clock,
            ..Self::new(repository)
        }
    }

    /// ID生成関数を差し替える
    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// リクエストを処理してCORSヘッダー付きレスポンスを返す
    ///
    /// エラーはすべてステータスコードとメッセージに変換され、
    /// この関数自体は失敗しない。
    pub async fn handle(&self, operation: PostOperation, request: &Request) -> Response<Body> {
        let origin = request_origin(request);

        if let Some(response) = preflight_response(request, &origin) {
            return response;
        }

        self.respond(operation, request, &origin).await
    }

    /// 検証済みのOriginを使ってリクエストを処理する
    ///
    /// Originヘッダーの再検証とプリフライト判定は行わない。
    pub async fn respond(
        &self,
        operation: PostOperation,
        request: &Request,
        origin: &str,
    ) -> Response<Body> {
        match self.execute(operation, request).await {
            Ok(reply) => {
                info!(
                    operation = %operation,
                    status = reply.status.as_u16(),
                    "リクエスト処理完了"
                );
                build_response(reply.status, reply.body, origin)
            }
            Err(err) => {
                let status = err.status_code();
                if status.is_server_error() {
                    error!(operation = %operation, status = status.as_u16(), error = %err, "リクエスト処理失敗");
                } else {
                    warn!(operation = %operation, status = status.as_u16(), error = %err, "リクエスト拒否");
                }
                build_error_response(status, &err.public_message(operation), origin)
            }
        }
    }

    /// 操作を実行し、成功時のステータスとボディを返す
    pub async fn execute(
        &self,
        operation: PostOperation,
        request: &Request,
    ) -> Result<PostReply, PostApiError> {
        match operation {
            PostOperation::Create => {
                let post = self.create_post(request.body().as_ref()).await?;
                PostReply::json(StatusCode::CREATED, &post)
            }
            PostOperation::Get => {
                let post = self.get_post(&path_post_id(request)?).await?;
                PostReply::json(StatusCode::OK, &post)
            }
            PostOperation::List => {
                let posts = self.list_posts().await?;
                PostReply::json(StatusCode::OK, &posts)
            }
            PostOperation::Update => {
                let post_id = path_post_id(request)?;
                let post = self.update_post(&post_id, request.body().as_ref()).await?;
                PostReply::json(StatusCode::OK, &post)
            }
            PostOperation::Delete => {
                self.delete_post(&path_post_id(request)?).await?;
                Ok(PostReply {
                    status: StatusCode::NO_CONTENT,
                    body: Body::Empty,
                })
            }
        }
    }

    /// 新規記事を作成する
    pub async fn create_post(&self, body: &[u8]) -> Result<Post, PostApiError> {
        let input = PostInput::parse(body)?;
        let post = Post::create((self.id_generator)(), input, (self.clock)());

        self.repository.create(&post).await?;

        info!(post_id = %post.id, "記事作成完了");
        Ok(post)
    }

    /// IDで記事を取得する
    pub async fn get_post(&self, post_id: &str) -> Result<Post, PostApiError> {
        self.repository
            .get(post_id)
            .await?
            .ok_or_else(|| PostApiError::NotFound(post_id.to_string()))
    }

    /// 全記事を作成日時の新しい順で取得する
    pub async fn list_posts(&self) -> Result<Vec<Post>, PostApiError> {
        let mut posts = self.repository.list().await?;
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        info!(post_count = posts.len(), "記事一覧取得完了");
        Ok(posts)
    }

    /// 記事のtitle/content/authorを上書きしupdatedAtを更新する
    pub async fn update_post(&self, post_id: &str, body: &[u8]) -> Result<Post, PostApiError> {
        let input = PostInput::parse(body)?;
        let updated_at = format_timestamp((self.clock)());

        let post = self
            .repository
            .update(post_id, &input, &updated_at)
            .await?
            .ok_or_else(|| PostApiError::NotFound(post_id.to_string()))?;

        info!(post_id = %post_id, "記事更新完了");
        Ok(post)
    }

    /// 記事を削除する（存在しなくても成功）
    pub async fn delete_post(&self, post_id: &str) -> Result<(), PostApiError> {
        self.repository.delete(post_id).await?;

        info!(post_id = %post_id, "記事削除完了");
        Ok(())
    }
}

/// パスパラメータから記事IDを取得する
fn path_post_id(request: &Request) -> Result<String, PostValidationError> {
    let params = request.path_parameters_ref();
    let post_id = params.and_then(|p| {
        p.first(POST_ID_PARAM)
            .or_else(|| p.first(POST_ID_PARAM_ALIAS))
    });
    require_post_id(post_id)
}
