//! 集成测试共用的假站点

use faculty_cards::error::{AppResult, FetchError};
use faculty_cards::infrastructure::{FetchResponse, Fetcher};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub const BASE: &str = "https://law.example.edu/full-time-faculty";
pub const ORIGIN: &str = "https://law.example.edu";

/// 内存中的站点：URL → 响应体 / 状态码，未登记的 URL 返回 404
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, Result<Vec<u8>, u16>>,
    requests: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), Err(status));
        self
    }

    /// 某个 URL 被请求的次数
    pub fn requests_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

impl Fetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> AppResult<FetchResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.pages.get(url.as_str()) {
            Some(Ok(body)) => Ok(FetchResponse {
                url: url.clone(),
                status: 200,
                body: body.clone(),
            }),
            Some(Err(404)) | None => Err(FetchError::NotFound {
                url: url.to_string(),
            }
            .into()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }
            .into()),
        }
    }
}

/// 列表卡片；`image` 为 None 时卡片不带图片
pub fn card(slug: &str, name: &str, role: &str, image: Option<&str>) -> String {
    let img = image
        .map(|src| format!(r#"<img class="gw-person-card-image" src="{src}">"#))
        .unwrap_or_default();
    format!(
        r#"<div class="gw-person-card">{img}
             <h3><a href="/{slug}">{name}</a></h3>
             <div class="card-person-role">{role}</div>
             <a href="mailto:{slug}@law.example.edu">Email</a>
           </div>"#
    )
}

pub fn listing(cards: &[String]) -> String {
    format!(
        r#"<html><body><div class="view-content">{}</div></body></html>"#,
        cards.concat()
    )
}

/// 个人主页：有简介，可选论文栏目
pub fn profile(name: &str, publications: &[&str]) -> String {
    let section = if publications.is_empty() {
        String::new()
    } else {
        let items: String = publications
            .iter()
            .map(|p| format!("<li>{p}</li>"))
            .collect();
        format!("<section><h2>Publications</h2><ul>{items}</ul></section>")
    };
    format!(
        r#"<html><body><main>
             <h1>{name}</h1>
             <p>Contact: {name}, Room 101, phone and office hours listed below for students.</p>
             <p>{name} teaches and writes about constitutional law, administrative law, and the
                history of the federal courts, and has testified before Congress on judicial reform.</p>
             {section}
           </main></body></html>"#
    )
}
