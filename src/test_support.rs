//! 单元测试用的内存抓取器

use crate::error::{AppResult, FetchError};
use crate::infrastructure::{FetchResponse, Fetcher};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

enum Reply {
    Body(Vec<u8>),
    Status(u16),
}

/// 按 URL 返回预置内容，未登记的 URL 一律 404
#[derive(Default)]
pub struct FakeFetcher {
    replies: HashMap<String, Reply>,
    hits: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.replies.insert(url.to_string(), Reply::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.replies.insert(url.to_string(), Reply::Status(status));
        self
    }

    /// 某个 URL 被请求的次数
    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> AppResult<FetchResponse> {
        *self
            .hits
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        match self.replies.get(url.as_str()) {
            Some(Reply::Body(body)) => Ok(FetchResponse {
                url: url.clone(),
                status: 200,
                body: body.clone(),
            }),
            Some(Reply::Status(404)) | None => Err(FetchError::NotFound {
                url: url.to_string(),
            }
            .into()),
            Some(Reply::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }
            .into()),
        }
    }
}

/// 一张标准教师卡片
pub fn person_card(slug: &str, name: &str, role: &str) -> String {
    format!(
        r#"<div class="gw-person-card">
             <img class="gw-person-card-image" src="/images/{slug}.jpg">
             <a href="/{slug}">{name}</a>
             <p class="card-person-role">{role}</p>
           </div>"#
    )
}

/// 包装成完整的列表页
pub fn listing_page(cards: &[String]) -> String {
    format!(
        "<html><body><main><div class=\"view\">{}</div></main></body></html>",
        cards.join("\n")
    )
}
