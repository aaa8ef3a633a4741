/// ログ基盤モジュール
///
/// Lambda/CloudWatch向けにtracingのJSON形式ログを設定する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 本番のデフォルトログレベル
const DEFAULT_DIRECTIVE: &str = "info";

/// テストのデフォルトログレベル
#[cfg(test)]
const TEST_DEFAULT_DIRECTIVE: &str = "debug";

static INIT: Once = Once::new();

/// ログフィルターを構築する
///
/// `directive`が未指定または解釈できない場合は`default`を使う。
fn build_env_filter(directive: Option<&str>, default: &str) -> EnvFilter {
    directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// `RUST_LOG`からログフィルターを構築する
fn env_filter_from_env(default: &str) -> EnvFilter {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_env_filter(directive.as_deref(), default)
}

/// 本番用のログサブスクライバーを初期化する
///
/// 複数回呼び出しても初期化は最初の一回のみ。
pub fn init_logging() {
    INIT.call_once(|| {
        // CloudWatchで検索しやすいよう、イベントのフィールドをトップレベルに展開する
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            .with_current_span(false);

        let _ = tracing_subscriber::registry()
            .with(env_filter_from_env(DEFAULT_DIRECTIVE))
            .with(json_layer)
            .try_init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter_from_env(TEST_DEFAULT_DIRECTIVE))
            .with(fmt_layer)
            .try_init();
    });
}
