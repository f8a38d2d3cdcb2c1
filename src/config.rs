use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// 默认配置文件名（位于工作目录，可选）
pub const CONFIG_FILE_NAME: &str = "faculty_cards.toml";

/// 随机延迟区间（毫秒）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// 零延迟（测试用）
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 教师列表首页
    pub base_url: String,
    /// 数据集名称，决定输出文件名
    pub dataset_name: String,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 媒体子目录名
    pub media_dir_name: String,
    /// 请求头 User-Agent
    pub user_agent: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 列表翻页间隔
    pub page_delay: DelayRange,
    /// 个人主页请求间隔
    pub profile_delay: DelayRange,
    /// 图片下载间隔
    pub image_delay: DelayRange,
    /// 简介段落的最小字符数（不含）
    pub min_bio_chars: usize,
    /// 最多保留的论文条数
    pub max_publications: usize,
    /// 外部学术库链接的匹配模式
    pub scholarly_link_pattern: String,
    // --- 卡组配置 ---
    pub deck_id: i64,
    pub deck_name: String,
    pub model_id: i64,
    pub tags: Vec<String>,
    /// 运行日志文件
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.law.gwu.edu/full-time-faculty".to_string(),
            dataset_name: "gwlaw_faculty".to_string(),
            output_dir: PathBuf::from("out"),
            media_dir_name: "media".to_string(),
            user_agent: "faculty-cards/0.1 (+contact: you@example.com)".to_string(),
            request_timeout_secs: 30,
            page_delay: DelayRange::new(1500, 3000),
            profile_delay: DelayRange::new(1500, 3000),
            image_delay: DelayRange::new(1500, 3000),
            min_bio_chars: 120,
            max_publications: 3,
            scholarly_link_pattern:
                r"(?i)(scholarship\.law\.gwu\.edu|ssrn\.com|works\.bepress\.com|scholar\.google\.)"
                    .to_string(),
            deck_id: 2059400110,
            deck_name: "GW Law — Full-Time Faculty".to_string(),
            model_id: 1607392319,
            tags: vec!["gwlaw".to_string(), "full-time-faculty".to_string()],
            log_file: "out/run.log".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 ← 工作目录下的配置文件（可选）← 环境变量（可选）
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::from_file_or_default(Path::new(CONFIG_FILE_NAME))?
            .with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 读取配置文件，文件不存在时使用默认值
    ///
    /// 文件存在但无法读取（权限、编码）时返回错误
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content, &display),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::FileReadFailed {
                path: display,
                source,
            }),
        }
    }

    /// 从 TOML 文本解析，缺省字段使用默认值
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::FileParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// 读取可选的环境变量覆盖
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = std::env::var("FACULTY_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("FACULTY_OUTPUT_DIR") {
            self.log_file = Path::new(&v).join("run.log").to_string_lossy().to_string();
            self.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FACULTY_MIN_BIO_CHARS") {
            self.min_bio_chars = v.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "FACULTY_MIN_BIO_CHARS".to_string(),
                value: v.clone(),
                expected_type: "usize".to_string(),
            })?;
        }
        if let Ok(v) = std::env::var("FACULTY_NO_DELAY") {
            let no_delay: bool = v.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "FACULTY_NO_DELAY".to_string(),
                value: v.clone(),
                expected_type: "bool".to_string(),
            })?;
            if no_delay {
                self = self.without_delays();
            }
        }
        Ok(self)
    }

    /// 测试用配置：零延迟，输出到指定目录
    pub fn for_tests(base_url: &str, output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            base_url: base_url.to_string(),
            log_file: output_dir.join("run.log").to_string_lossy().to_string(),
            output_dir,
            ..Self::default()
        }
        .without_delays()
    }

    pub fn without_delays(mut self) -> Self {
        self.page_delay = DelayRange::none();
        self.profile_delay = DelayRange::none();
        self.image_delay = DelayRange::none();
        self
    }

    /// 检查配置是否合法
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        self.scholarly_regex()?;
        for (name, range) in [
            ("page_delay", self.page_delay),
            ("profile_delay", self.profile_delay),
            ("image_delay", self.image_delay),
        ] {
            if range.min_ms > range.max_ms {
                return Err(ConfigError::InvalidDelay {
                    name,
                    min_ms: range.min_ms,
                    max_ms: range.max_ms,
                });
            }
        }
        Ok(())
    }

    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            value: self.base_url.clone(),
            source,
        })
    }

    pub fn scholarly_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.scholarly_link_pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.scholarly_link_pattern.clone(),
            source,
        })
    }

    pub fn media_dir(&self) -> PathBuf {
        self.output_dir.join(&self.media_dir_name)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.dataset_name))
    }

    pub fn apkg_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.apkg", self.dataset_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_paths() {
        let config = Config::default();
        assert_eq!(config.csv_path(), PathBuf::from("out/gwlaw_faculty.csv"));
        assert_eq!(config.apkg_path(), PathBuf::from("out/gwlaw_faculty.apkg"));
        assert_eq!(config.media_dir(), PathBuf::from("out/media"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = Config::from_toml_str(
            r#"
            base_url = "https://example.edu/people"
            min_bio_chars = 80

            [page_delay]
            min_ms = 0
            max_ms = 10
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.base_url, "https://example.edu/people");
        assert_eq!(config.min_bio_chars, 80);
        assert_eq!(config.page_delay, DelayRange::new(0, 10));
        // 未出现的字段保持默认
        assert_eq!(config.max_publications, 3);
        assert_eq!(config.dataset_name, "gwlaw_faculty");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.base_url, Config::default().base_url);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, [0xFFu8, 0xFE, 0x00]).unwrap();

        assert!(matches!(
            Config::from_file_or_default(&path),
            Err(ConfigError::FileReadFailed { .. })
        ));
    }

    #[test]
    fn test_invalid_delay_rejected() {
        let mut config = Config::default();
        config.image_delay = DelayRange::new(10, 5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDelay { name: "image_delay", .. })
        ));
    }

    #[test]
    fn test_for_tests_has_no_delay() {
        let config = Config::for_tests("http://fake.test/list", "/tmp/x");
        assert!(config.page_delay.is_zero());
        assert!(config.profile_delay.is_zero());
        assert!(config.image_delay.is_zero());
        assert_eq!(config.media_dir(), PathBuf::from("/tmp/x/media"));
    }
}
