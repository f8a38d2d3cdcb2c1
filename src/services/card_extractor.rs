//! 卡片解析服务 - 业务能力层
//!
//! 只负责"从一页列表中解析教师卡片"，不关心翻页和请求

use crate::models::ListingEntry;
use crate::services::rules::RuleChain;
use crate::utils::html::{is_mailto, non_empty_text, resolve_attr};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.gw-person-card").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3, h4").unwrap());
static ROLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card-person-role").unwrap());
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static CARD_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.gw-person-card-image[src]").unwrap());
static ANY_IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());

/// 单张卡片的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    Entry(ListingEntry),
    /// 只有 mailto 链接
    MailtoOnly,
    /// 没有任何链接
    NoLink,
    /// 所有兜底规则都取不到名字
    Nameless { profile_url: Url },
}

/// 卡片解析服务
///
/// 职责：
/// - 定位列表页中的卡片
/// - 对每张卡片按规则链提取姓名、职称、主页链接、缩略图
/// - 同页内按主页链接去重（保留最先出现的）
#[derive(Debug, Default, Clone, Copy)]
pub struct CardExtractor;

impl CardExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 统计页面中的卡片数量（翻页终止判断用）
    pub fn count_cards(document: &Html) -> usize {
        document.select(&CARD).count()
    }

    /// 解析一页列表
    ///
    /// # 参数
    /// - `document`: 已解析的列表页
    /// - `page_url`: 列表页地址（解析相对链接）
    ///
    /// # 返回
    /// 返回去重后的教师条目，顺序与页面一致
    pub fn extract(&self, document: &Html, page_url: &Url) -> Vec<ListingEntry> {
        let cards: Vec<ElementRef<'_>> = document.select(&CARD).collect();
        debug!("在 {} 找到 {} 张卡片", page_url, cards.len());

        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for card in cards {
            match self.parse_card(card, page_url) {
                CardOutcome::Entry(entry) => {
                    if seen.insert(entry.profile_url.clone()) {
                        entries.push(entry);
                    } else {
                        debug!("同页重复卡片，跳过: {}", entry.profile_url);
                    }
                }
                CardOutcome::MailtoOnly => debug!("卡片只有 mailto 链接，跳过"),
                CardOutcome::NoLink => debug!("卡片没有链接，跳过"),
                CardOutcome::Nameless { profile_url } => {
                    warn!("⚠️ 卡片缺少姓名，跳过: {}", profile_url)
                }
            }
        }

        entries
    }

    /// 解析单张卡片
    pub fn parse_card(&self, card: ElementRef<'_>, page_url: &Url) -> CardOutcome {
        let links: Vec<ElementRef<'_>> = card.select(&LINK).collect();
        let primary = links
            .iter()
            .copied()
            .find(|a| !a.value().attr("href").is_some_and(is_mailto));

        let Some(primary) = primary else {
            return if links.is_empty() {
                CardOutcome::NoLink
            } else {
                CardOutcome::MailtoOnly
            };
        };

        let Some(profile_url) = resolve_attr(primary, "href", page_url) else {
            return CardOutcome::NoLink;
        };

        let name = RuleChain::<ElementRef<'_>, String>::new("name")
            .rule("主链接文本", |_| non_empty_text(primary))
            .rule("卡片内标题", |c| {
                c.select(&HEADING).next().and_then(non_empty_text)
            })
            .first_match(&card);

        let Some(name) = name else {
            return CardOutcome::Nameless { profile_url };
        };

        let title = RuleChain::<ElementRef<'_>, String>::new("title")
            .rule("职称元素", |c| c.select(&ROLE).next().and_then(non_empty_text))
            .rule("首个段落", |c| {
                c.select(&PARAGRAPH).next().and_then(non_empty_text)
            })
            .first_match(&card)
            .unwrap_or_default();

        let thumbnail_url = RuleChain::<ElementRef<'_>, Url>::new("thumbnail")
            .rule("卡片专用图片", |c| {
                c.select(&CARD_IMAGE)
                    .find_map(|img| resolve_attr(img, "src", page_url))
            })
            .rule("首张图片", |c| {
                c.select(&ANY_IMAGE)
                    .find_map(|img| resolve_attr(img, "src", page_url))
            })
            .first_match(&card);

        CardOutcome::Entry(ListingEntry {
            name,
            title,
            profile_url,
            thumbnail_url,
        })
    }
}
