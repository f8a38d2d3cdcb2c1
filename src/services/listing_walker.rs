//! 列表翻页服务 - 业务能力层
//!
//! 只负责"逐页取回列表"，不解析卡片内容

use crate::error::AppResult;
use crate::infrastructure::{Fetcher, Pacer};
use crate::services::card_extractor::CardExtractor;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

/// 一页已解析的列表
pub struct ListingPage {
    /// 页码（从 0 开始）
    pub index: usize,
    pub url: Url,
    pub document: Html,
    pub card_count: usize,
}

/// 列表翻页器
///
/// 惰性、有限、不可重启：
/// - 第 0 页为原始地址，之后追加 `page=N` 查询参数
/// - 遇到没有卡片的页面或 404 即视为结束（该页不输出）
/// - 其他请求错误原样上抛
/// - 结束后继续调用始终返回 `None`
pub struct ListingWalker<'a, F: Fetcher> {
    fetcher: &'a F,
    base_url: Url,
    pacer: Pacer,
    next_index: usize,
    finished: bool,
}

impl<'a, F: Fetcher> ListingWalker<'a, F> {
    /// 创建新的翻页器
    ///
    /// # 参数
    /// - `fetcher`: 抓取器
    /// - `base_url`: 列表首页
    /// - `pacer`: 翻页间隔
    pub fn new(fetcher: &'a F, base_url: Url, pacer: Pacer) -> Self {
        Self {
            fetcher,
            base_url,
            pacer,
            next_index: 0,
            finished: false,
        }
    }

    /// 第 N 页的地址
    pub fn page_url(base_url: &Url, index: usize) -> Url {
        let mut url = base_url.clone();
        if index > 0 {
            url.query_pairs_mut()
                .append_pair("page", &index.to_string());
        }
        url
    }

    /// 已经输出的页数
    pub fn pages_emitted(&self) -> usize {
        self.next_index
    }

    /// 取下一页
    ///
    /// # 返回
    /// - `Ok(Some(page))`: 有卡片的一页
    /// - `Ok(None)`: 分页结束
    /// - `Err(_)`: 非 404 的请求失败
    pub async fn next_page(&mut self) -> AppResult<Option<ListingPage>> {
        if self.finished {
            return Ok(None);
        }

        if self.next_index > 0 {
            self.pacer.pause().await;
        }

        let url = Self::page_url(&self.base_url, self.next_index);
        let response = match self.fetcher.fetch(&url).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                info!("🏁 第 {} 页返回 404，分页结束", self.next_index + 1);
                self.finished = true;
                return Ok(None);
            }
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        let document = Html::parse_document(&response.text());
        let card_count = CardExtractor::count_cards(&document);
        debug!("第 {} 页共 {} 张卡片", self.next_index + 1, card_count);

        if card_count == 0 {
            info!("🏁 第 {} 页没有卡片，分页结束", self.next_index + 1);
            self.finished = true;
            return Ok(None);
        }

        let page = ListingPage {
            index: self.next_index,
            url,
            document,
            card_count,
        };
        self.next_index += 1;
        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelayRange;
    use crate::test_support::{listing_page, person_card, FakeFetcher};

    const BASE: &str = "https://www.example.edu/full-time-faculty";

    fn walker(fetcher: &FakeFetcher) -> ListingWalker<'_, FakeFetcher> {
        ListingWalker::new(
            fetcher,
            Url::parse(BASE).unwrap(),
            Pacer::new(DelayRange::none()),
        )
    }

    #[test]
    fn test_page_url() {
        let base = Url::parse(BASE).unwrap();

        assert_eq!(
            ListingWalker::<FakeFetcher>::page_url(&base, 0).as_str(),
            BASE
        );
        assert_eq!(
            ListingWalker::<FakeFetcher>::page_url(&base, 3).as_str(),
            "https://www.example.edu/full-time-faculty?page=3"
        );
    }

    #[tokio::test]
    async fn test_empty_page_terminates_without_emission() {
        let fetcher = FakeFetcher::new()
            .with_page(BASE, listing_page(&[person_card("a", "Ann A", "Professor")]))
            .with_page(
                &format!("{BASE}?page=1"),
                listing_page(&[person_card("b", "Ben B", "Professor")]),
            )
            .with_page(&format!("{BASE}?page=2"), listing_page(&[]));

        let mut walker = walker(&fetcher);
        let mut indexes = Vec::new();
        while let Some(page) = walker.next_page().await.unwrap() {
            indexes.push(page.index);
        }

        assert_eq!(indexes, vec![0, 1]);
        assert_eq!(walker.pages_emitted(), 2);
        // 结束后不再发请求
        assert!(walker.next_page().await.unwrap().is_none());
        assert_eq!(fetcher.hits(&format!("{BASE}?page=2")), 1);
        assert_eq!(fetcher.hits(&format!("{BASE}?page=3")), 0);
    }

    #[tokio::test]
    async fn test_not_found_terminates_cleanly() {
        let fetcher = FakeFetcher::new()
            .with_page(BASE, listing_page(&[person_card("a", "Ann A", "Professor")]));

        let mut walker = walker(&fetcher);
        let first = walker.next_page().await.unwrap().unwrap();
        assert_eq!(first.card_count, 1);
        assert!(walker.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_status_is_fatal() {
        let fetcher = FakeFetcher::new()
            .with_page(BASE, listing_page(&[person_card("a", "Ann A", "Professor")]))
            .with_status(&format!("{BASE}?page=1"), 503);

        let mut walker = walker(&fetcher);
        assert!(walker.next_page().await.unwrap().is_some());
        let err = walker.next_page().await.err().unwrap();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("503"));
    }
}
