use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络请求错误
    #[error("请求错误: {0}")]
    Fetch(#[from] FetchError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 网络请求错误
///
/// `NotFound` 与其他状态码分开，列表分页用它判断结束
#[derive(Debug, Error)]
pub enum FetchError {
    /// 404
    #[error("页面不存在: {url}")]
    NotFound { url: String },
    /// 其他非 2xx 状态码
    #[error("HTTP 状态码 {status}: {url}")]
    Status { url: String, status: u16 },
    /// 网络层失败（连接、超时、读取响应体）
    #[error("请求失败 ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL 解析失败
    #[error("无效的 URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// 正则表达式编译失败
    #[error("无效的正则表达式 '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// 延迟区间不合法
    #[error("延迟区间 {name} 不合法: min={min_ms}ms > max={max_ms}ms")]
    InvalidDelay {
        name: &'static str,
        min_ms: u64,
        max_ms: u64,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件存在但无法读取
    #[error("配置文件读取失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV 写入失败
    #[error("CSV 写入失败 ({path}): {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// 卡组数据库写入失败
    #[error("卡组数据库写入失败: {0}")]
    Database(#[from] rusqlite::Error),
    /// 卡组压缩包写入失败
    #[error("卡组压缩包写入失败: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// 卡组 JSON 序列化失败
    #[error("卡组 JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 媒体文件缺失或不可读
    #[error("媒体文件不可读 ({path}): {source}")]
    Media {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 临时文件落盘失败
    #[error("文件落盘失败 ({path}): {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件操作错误
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// 是否为 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Fetch(FetchError::NotFound { .. }))
    }
}

impl FetchError {
    /// 创建网络层失败错误
    pub fn request(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::Request {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        let not_found: AppError = FetchError::NotFound {
            url: "https://example.edu/faculty?page=9".to_string(),
        }
        .into();
        let status: AppError = FetchError::Status {
            url: "https://example.edu/faculty".to_string(),
            status: 500,
        }
        .into();

        assert!(not_found.is_not_found());
        assert!(!status.is_not_found());
        assert!(status.to_string().contains("500"));
    }
}
