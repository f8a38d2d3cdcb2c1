//! 列表处理器 - 编排层
//!
//! 翻完所有列表页，解析卡片，跨页去重

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{Fetcher, Pacer};
use crate::models::ListingEntry;
use crate::services::{CardExtractor, ListingWalker, Reconciler};
use crate::utils::logging::{log_listing_done, log_page_parsed};

/// 列表阶段的产出
#[derive(Debug, Clone, Default)]
pub struct ListingSummary {
    /// 去重后的条目（首次出现顺序）
    pub entries: Vec<ListingEntry>,
    /// 有效页数
    pub pages: usize,
    /// 去重前的条目数
    pub raw: usize,
    /// 跨页重复数
    pub duplicates: usize,
}

/// 收集全部列表条目
///
/// 列表页请求失败（404 之外）直接上抛，整次运行中止
pub async fn collect_listing<F: Fetcher>(fetcher: &F, config: &Config) -> AppResult<ListingSummary> {
    let base_url = config.parsed_base_url()?;
    let mut walker = ListingWalker::new(fetcher, base_url, Pacer::new(config.page_delay));
    let extractor = CardExtractor::new();
    let mut reconciler = Reconciler::new();
    let mut raw = 0;

    while let Some(page) = walker.next_page().await? {
        let entries = extractor.extract(&page.document, &page.url);
        log_page_parsed(page.index, page.url.as_str(), entries.len());
        raw += entries.len();
        reconciler.extend(entries);
    }

    let pages = walker.pages_emitted();
    log_listing_done(pages, raw, reconciler.len());

    let duplicates = reconciler.duplicates();
    Ok(ListingSummary {
        entries: reconciler.into_entries(),
        pages,
        raw,
        duplicates,
    })
}
