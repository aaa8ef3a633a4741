/// ブログ記事のドメインモデル
///
/// 記事レコード本体と、作成・更新リクエストの入力値を定義する。
/// 入力値の検証はAPI境界でのみ行い、ストア側では強制しない。
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 入力検証のエラー型
///
/// Displayの文言はそのままクライアントへのエラーメッセージとして返却される。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostValidationError {
    /// リクエストボディがJSONとして解釈できない
    #[error("Invalid request body")]
    InvalidBody(String),

    /// title/content/authorのいずれかが空
    #[error("Title, content, and author cannot be empty")]
    EmptyField,

    /// パスパラメータの記事IDが欠落
    #[error("PostID is required")]
    MissingPostId,
}

/// ブログ記事
///
/// JSONとDynamoDBの両方で同じ属性名（postId, createdAt, updatedAt）を使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// 記事ID（パーティションキー）
    #[serde(rename = "postId")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    /// 作成日時（ISO-8601, UTC）。作成後は変更しない
    pub created_at: String,
    /// 最終更新日時（ISO-8601, UTC）
    pub updated_at: String,
}

impl Post {
    /// 検証済みの入力から新規記事を生成する
    ///
    /// createdAtとupdatedAtには同じ時刻を設定する。
    pub fn create(id: String, input: PostInput, now: DateTime<Utc>) -> Self {
        let timestamp = format_timestamp(now);
        Self {
            id,
            title: input.title,
            content: input.content,
            author: input.author,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}

/// 記事の作成・更新リクエストボディ
///
/// 欠落したフィールドとnullは空文字列として扱い、`validate`で拒否する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInput {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub author: String,
}

impl PostInput {
    /// リクエストボディをパースして検証する
    ///
    /// ボディはJSONオブジェクトのみ受け付ける。`null`は空のオブジェクトと同じ扱い。
    pub fn parse(body: &[u8]) -> Result<Self, PostValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PostValidationError::InvalidBody(e.to_string()))?;

        let input = match value {
            Value::Null => PostInput::default(),
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| PostValidationError::InvalidBody(e.to_string()))?,
            other => {
                return Err(PostValidationError::InvalidBody(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };
        input.validate()
    }

    /// 全フィールドが空でないことを検証する
    pub fn validate(self) -> Result<Self, PostValidationError> {
        if self.title.is_empty() || self.content.is_empty() || self.author.is_empty() {
            return Err(PostValidationError::EmptyField);
        }
        Ok(self)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// パスパラメータから取り出した記事IDを検証する
pub fn require_post_id(post_id: Option<&str>) -> Result<String, PostValidationError> {
    match post_id {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(PostValidationError::MissingPostId),
    }
}

/// タイムスタンプを秒精度のRFC3339形式（末尾Z）に整形する
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
