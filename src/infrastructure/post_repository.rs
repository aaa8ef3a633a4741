/// DynamoDBでブログ記事を管理するための記事リポジトリ
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::domain::{Post, PostInput};
use crate::infrastructure::config::{PostsTableConfig, PostsTableConfigError};

/// パーティションキーの属性名
pub const POST_ID_ATTRIBUTE: &str = "postId";

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostRepositoryError {
    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// アイテムとPostの相互変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for PostRepositoryError {
    fn from(err: serde_dynamo::Error) -> Self {
        PostRepositoryError::SerializationError(err.to_string())
    }
}

/// 記事の永続化を抽象化するトレイト
///
/// DynamoDB実装とテスト用のインメモリ実装を差し替えられるようにする。
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// 新規記事を保存する
    ///
    /// 同じIDの記事が既に存在する場合は上書きせず`WriteError`を返す。
    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// IDで記事を取得する。存在しなければ`Ok(None)`
    async fn get(&self, post_id: &str) -> Result<Option<Post>, PostRepositoryError>;

    /// 全記事を取得する（順序は不定）
    async fn list(&self) -> Result<Vec<Post>, PostRepositoryError>;

    /// title/content/authorとupdatedAtを上書きし、更新後の記事を返す
    ///
    /// 記事が存在しない場合は何も書き込まず`Ok(None)`を返す。
    /// postIdとcreatedAtは変更しない。
    async fn update(
        &self,
        post_id: &str,
        input: &PostInput,
        updated_at: &str,
    ) -> Result<Option<Post>, PostRepositoryError>;

    /// 記事を削除する。存在しない記事の削除も成功扱い
    async fn delete(&self, post_id: &str) -> Result<(), PostRepositoryError>;
}

/// PostRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoPostRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoPostRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn from_config(config: &PostsTableConfig) -> Self {
        Self::new(config.client().clone(), config.table_name().to_string())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key(post_id: &str) -> AttributeValue {
        AttributeValue::S(post_id.to_string())
    }
}

#[async_trait]
impl PostRepository for DynamoPostRepository {
    async fn create(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(post)?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#postId)")
            .expression_attribute_names("#postId", POST_ID_ATTRIBUTE)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    Err(PostRepositoryError::WriteError(format!(
                        "Post already exists: {}",
                        post.id
                    )))
                } else {
                    Err(PostRepositoryError::WriteError(service_error.to_string()))
                }
            }
        }
    }

    async fn get(&self, post_id: &str) -> Result<Option<Post>, PostRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(POST_ID_ATTRIBUTE, Self::key(post_id))
            .send()
            .await
            .map_err(|e| PostRepositoryError::ReadError(e.into_service_error().to_string()))?;

        match result.item {
            Some(item) if !item.is_empty() => Ok(Some(serde_dynamo::from_item(item)?)),
            _ => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Post>, PostRepositoryError> {
        let mut posts = Vec::new();
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        let mut page_count = 0usize;

        // LastEvaluatedKeyがなくなるまでページを辿る
        loop {
            let response = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| PostRepositoryError::ReadError(e.into_service_error().to_string()))?;

            page_count += 1;

            if let Some(items) = response.items {
                let page: Vec<Post> = serde_dynamo::from_items(items)?;
                posts.extend(page);
            }

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        debug!(
            table_name = %self.table_name,
            page_count = page_count,
            post_count = posts.len(),
            "記事テーブルのスキャン完了"
        );

        Ok(posts)
    }

    async fn update(
        &self,
        post_id: &str,
        input: &PostInput,
        updated_at: &str,
    ) -> Result<Option<Post>, PostRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(POST_ID_ATTRIBUTE, Self::key(post_id))
            .update_expression(
                "SET #title = :title, #content = :content, #author = :author, #updatedAt = :updatedAt",
            )
            .condition_expression("attribute_exists(#postId)")
            .expression_attribute_names("#postId", POST_ID_ATTRIBUTE)
            .expression_attribute_names("#title", "title")
            .expression_attribute_names("#content", "content")
            .expression_attribute_names("#author", "author")
            .expression_attribute_names("#updatedAt", "updatedAt")
            .expression_attribute_values(":title", AttributeValue::S(input.title.clone()))
            .expression_attribute_values(":content", AttributeValue::S(input.content.clone()))
            .expression_attribute_values(":author", AttributeValue::S(input.author.clone()))
            .expression_attribute_values(":updatedAt", AttributeValue::S(updated_at.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service_error = err.into_service_error();
                // 条件不成立 = 記事が存在しない
                if service_error.is_conditional_check_failed_exception() {
                    return Ok(None);
                }
                return Err(PostRepositoryError::WriteError(service_error.to_string()));
            }
        };

        match output.attributes {
            Some(attributes) => Ok(Some(serde_dynamo::from_item(attributes)?)),
            None => Err(PostRepositoryError::SerializationError(
                "UpdateItem returned no attributes".to_string(),
            )),
        }
    }

    async fn delete(&self, post_id: &str) -> Result<(), PostRepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(POST_ID_ATTRIBUTE, Self::key(post_id))
            .send()
            .await
            .map_err(|e| PostRepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

/// DynamoPostRepositoryの静的インスタンス
///
/// Lambda warm start時にクライアントを再利用するため、
/// 一度初期化したリポジトリを実行環境内で共有する。
static POST_REPOSITORY: OnceCell<DynamoPostRepository> = OnceCell::const_new();

/// 共有リポジトリを取得（初期化されていなければ初期化）
///
/// 初期化に失敗した場合は結果を保持せず、次回の呼び出しで再試行する。
pub async fn shared_post_repository() -> Result<&'static DynamoPostRepository, PostsTableConfigError> {
    POST_REPOSITORY
        .get_or_try_init(|| async {
            let config = PostsTableConfig::from_env().await?;
            Ok(DynamoPostRepository::from_config(&config))
        })
        .await
}
