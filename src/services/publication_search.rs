//! 外部学术库检索 - 业务能力层
//!
//! 个人主页没有论文栏目时，到外部学术库页面尽力抓几条论文标题。
//! 任何失败都只记录日志，返回空列表

use crate::infrastructure::{Fetcher, Pacer};
use crate::utils::html::element_text;
use crate::utils::text::char_len;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

/// 论文条目长度下限（不含）
pub const PUBLICATION_MIN_CHARS: usize = 5;
/// 论文条目长度上限（不含）
pub const PUBLICATION_MAX_CHARS: usize = 500;

/// 按优先级排列：列表项 → 带标题的文章元素 → 标题 → 段落
static FRAGMENT_SELECTORS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    [
        ("列表项", "li"),
        ("文章标题", "article .title, article [title], .article-title"),
        ("标题", "h2, h3, h4"),
        ("段落", "p"),
    ]
    .into_iter()
    .map(|(name, css)| (name, Selector::parse(css).unwrap()))
    .collect()
});

/// 长度是否落在论文条目的合理区间
pub fn is_publication_text(text: &str) -> bool {
    let len = char_len(text);
    len > PUBLICATION_MIN_CHARS && len < PUBLICATION_MAX_CHARS
}

/// 外部学术库检索服务
pub struct PublicationSearch<'a, F: Fetcher> {
    fetcher: &'a F,
    pacer: Pacer,
    max_items: usize,
}

impl<'a, F: Fetcher> PublicationSearch<'a, F> {
    pub fn new(fetcher: &'a F, pacer: Pacer, max_items: usize) -> Self {
        Self {
            fetcher,
            pacer,
            max_items,
        }
    }

    /// 抓取外部页面并提取论文片段
    ///
    /// # 返回
    /// 最多 `max_items` 条；请求或解析失败时返回空列表
    pub async fn lookup(&self, url: &Url) -> Vec<String> {
        info!("🔎 个人主页无论文栏目，尝试外部学术库: {}", url);
        self.pacer.pause().await;

        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️ 外部学术库请求失败，忽略: {}", e);
                return Vec::new();
            }
        };

        let document = Html::parse_document(&response.text());
        let fragments = extract_fragments(&document, self.max_items);
        debug!("外部学术库提取到 {} 条论文", fragments.len());
        fragments
    }
}

/// 按选择器优先级收集短文本片段（去重，最多 `max_items` 条）
pub fn extract_fragments(document: &Html, max_items: usize) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();

    for (name, selector) in FRAGMENT_SELECTORS.iter() {
        for element in document.select(selector) {
            if fragments.len() >= max_items {
                return fragments;
            }
            let mut text = element_text(element);
            if text.is_empty() {
                text = element
                    .value()
                    .attr("title")
                    .map(crate::utils::clean_text)
                    .unwrap_or_default();
            }
            if is_publication_text(&text) && !fragments.contains(&text) {
                debug!("外部片段来自{}: {}", name, text);
                fragments.push(text);
            }
        }
    }

    fragments
}
