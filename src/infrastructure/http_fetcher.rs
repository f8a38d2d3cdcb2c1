//! HTTP 抓取器 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端，只暴露"按 URL 取回页面"的能力

use crate::config::Config;
use crate::error::{AppResult, FetchError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// 一次成功请求的响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub url: Url,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// 按 UTF-8 解码响应体（非法字节替换）
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 抓取能力
///
/// 约定：
/// - 404 返回 `FetchError::NotFound`
/// - 其他非 2xx 返回 `FetchError::Status`
/// - 网络层失败返回 `FetchError::Request`
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> AppResult<FetchResponse>;
}

/// 基于 reqwest 的抓取器
///
/// 职责：
/// - 持有 reqwest::Client（连接池、超时、User-Agent）
/// - 把 HTTP 状态码映射为 FetchError
/// - 不认识教师 / 列表页
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// 创建新的抓取器
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FetchError::request("<client>", e))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> AppResult<FetchResponse> {
        debug!("请求: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::request(url.as_str(), e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::request(url.as_str(), e))?;

        debug!("收到响应: {} ({}, {} 字节)", url, status, body.len());

        Ok(FetchResponse {
            url: url.clone(),
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
