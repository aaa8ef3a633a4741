/// 記事テーブルの接続設定
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// 記事テーブル名を指定する環境変数
pub const POSTS_TABLE_ENV: &str = "DYNAMODB_TABLE";

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostsTableConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// DynamoDBクライアントと記事テーブル名を持つ設定
///
/// テーブル名は環境変数`DYNAMODB_TABLE`から読み込む。
/// AWS認証情報とリージョンはaws-configが解決する。
#[derive(Debug, Clone)]
pub struct PostsTableConfig {
    client: DynamoDbClient,
    table_name: String,
}

impl PostsTableConfig {
    /// 環境からAWS設定とテーブル名を読み込む
    pub async fn from_env() -> Result<Self, PostsTableConfigError> {
        // 先にテーブル名を検証し、欠落時はAWS設定の読み込みを省く
        let table_name = table_name_from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, table_name })
    }

    /// 明示的な値で作成（テスト用）
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// 環境変数からテーブル名を読み込む
///
/// 空文字列は未設定として扱う。
fn table_name_from_env() -> Result<String, PostsTableConfigError> {
    std::env::var(POSTS_TABLE_ENV)
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| PostsTableConfigError::MissingEnvVar(POSTS_TABLE_ENV.to_string()))
}
