//! 个人主页解析服务 - 业务能力层
//!
//! 只负责"取回并解析一位教师的个人主页"，不关心合并和导出

use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::infrastructure::{Fetcher, Pacer};
use crate::models::ProfileRecord;
use crate::services::publication_search::{is_publication_text, PublicationSearch};
use crate::services::rules::RuleChain;
use crate::utils::html::{element_text, non_empty_text, parent_element, resolve_attr};
use crate::utils::text::char_len;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static MAIN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main").unwrap());
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static ROLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*='person-role'], [class*='person-title'], [class*='job-title'], [class*='position-title']",
    )
    .unwrap()
});
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li, p").unwrap());
static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());
static PUBLICATIONS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)publications").unwrap());

/// 简介段落中出现即视为联系方式的标记
const CONTACT_MARKERS: [&str; 3] = ["Contact:", "Email", "@"];

/// 个人主页的解析结果（未做外部检索前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProfile {
    pub record: ProfileRecord,
    /// 页面中是否存在论文栏目
    pub has_publication_section: bool,
    /// 外部学术库链接
    pub scholarly_link: Option<Url>,
}

/// 是否可作为简介段落
pub fn is_bio_candidate(text: &str, min_chars: usize) -> bool {
    char_len(text) > min_chars && !CONTACT_MARKERS.iter().any(|m| text.contains(m))
}

/// 个人主页解析服务
///
/// 职责：
/// - 请求个人主页
/// - 按规则链提取简介、论文、头像
/// - 本地无论文栏目时委托 PublicationSearch 做外部检索
pub struct ProfileEnricher<'a, F: Fetcher> {
    fetcher: &'a F,
    min_bio_chars: usize,
    max_publications: usize,
    scholarly_pattern: Regex,
    publication_search: PublicationSearch<'a, F>,
}

impl<'a, F: Fetcher> ProfileEnricher<'a, F> {
    /// 创建新的个人主页解析服务
    pub fn new(fetcher: &'a F, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            fetcher,
            min_bio_chars: config.min_bio_chars,
            max_publications: config.max_publications,
            scholarly_pattern: config.scholarly_regex()?,
            publication_search: PublicationSearch::new(
                fetcher,
                Pacer::new(config.profile_delay),
                config.max_publications,
            ),
        })
    }

    /// 取回并解析个人主页
    ///
    /// 主页请求失败时返回错误；外部学术库失败不会影响结果
    pub async fn enrich(&self, profile_url: &Url) -> AppResult<ProfileRecord> {
        let response = self.fetcher.fetch(profile_url).await?;

        let parsed = {
            let document = Html::parse_document(&response.text());
            self.parse(&document, profile_url)
        };

        let mut record = parsed.record;
        if !parsed.has_publication_section {
            if let Some(link) = parsed.scholarly_link {
                record.publications = self.publication_search.lookup(&link).await;
            } else {
                debug!("个人主页既无论文栏目也无学术库链接: {}", profile_url);
            }
        }

        Ok(record)
    }

    /// 解析已取回的个人主页（不发请求）
    pub fn parse(&self, document: &Html, page_url: &Url) -> ParsedProfile {
        let root = document.root_element();
        let min_chars = self.min_bio_chars;

        let bio = RuleChain::<ElementRef<'_>, String>::new("bio")
            .rule("main 区域段落", |r| {
                r.select(&MAIN)
                    .next()
                    .and_then(|main| first_bio_paragraph(main, min_chars))
            })
            .rule("全文段落", |r| first_bio_paragraph(*r, min_chars))
            .first_match(&root)
            .unwrap_or_default();

        let name = RuleChain::<ElementRef<'_>, String>::new("name")
            .rule("main 区域一级标题", |r| {
                r.select(&MAIN)
                    .next()
                    .and_then(|main| main.select(&H1).next())
                    .and_then(non_empty_text)
            })
            .first_match(&root)
            .unwrap_or_default();

        let title = RuleChain::<ElementRef<'_>, String>::new("title")
            .rule("职称元素", |r| r.select(&ROLE).find_map(non_empty_text))
            .first_match(&root)
            .unwrap_or_default();

        let image_url = RuleChain::<ElementRef<'_>, Url>::new("image")
            .rule("首张图片", |r| {
                r.select(&IMAGE)
                    .find_map(|img| resolve_attr(img, "src", page_url))
            })
            .first_match(&root);

        let publications = find_publication_section(root)
            .map(|heading| self.collect_section_items(heading))
            .unwrap_or_default();
        // 栏目为空等同于没有栏目
        let has_publication_section = !publications.is_empty();

        let scholarly_link = if has_publication_section {
            None
        } else {
            self.find_scholarly_link(root, page_url)
        };

        ParsedProfile {
            record: ProfileRecord {
                name,
                title,
                bio,
                image_url,
                publications,
            },
            has_publication_section,
            scholarly_link,
        }
    }

    /// 收集论文栏目的条目
    ///
    /// - 容器只属于这一个栏目：收集容器内的条目
    /// - 容器只是标题的包装层：收集包装层之后的兄弟元素
    /// - 容器还含有其他标题：收集标题之后的兄弟元素
    ///
    /// 兄弟元素遇到下一个标题即停止
    fn collect_section_items(&self, heading: ElementRef<'_>) -> Vec<String> {
        let heading_text = element_text(heading);
        let Some(container) = parent_element(heading) else {
            return Vec::new();
        };

        let mut items = Vec::new();
        let is_wrapper = element_text(container) == heading_text;
        let shares_container = container
            .select(&HEADINGS)
            .any(|h| h.id() != heading.id());

        if !is_wrapper && !shares_container {
            self.push_items(container, &heading_text, &mut items);
            return items;
        }

        let start = if is_wrapper { container } else { heading };
        for sibling in start.next_siblings().filter_map(ElementRef::wrap) {
            if items.len() >= self.max_publications || starts_new_section(sibling) {
                break;
            }
            self.push_items(sibling, &heading_text, &mut items);
        }
        items
    }

    /// 把 `scope`（含自身）中合格的 li / p 追加到 `items`
    fn push_items(&self, scope: ElementRef<'_>, heading_text: &str, items: &mut Vec<String>) {
        let own = ITEMS.matches(&scope).then_some(scope);
        for element in own.into_iter().chain(scope.select(&ITEMS)) {
            if items.len() >= self.max_publications {
                return;
            }
            let text = element_text(element);
            if text != heading_text && is_publication_text(&text) && !items.contains(&text) {
                items.push(text);
            }
        }
    }

    fn find_scholarly_link(&self, root: ElementRef<'_>, page_url: &Url) -> Option<Url> {
        root.select(&LINKS)
            .filter_map(|a| resolve_attr(a, "href", page_url))
            .find(|url| self.scholarly_pattern.is_match(url.as_str()))
    }
}

/// 第一个满足简介条件的段落
fn first_bio_paragraph(scope: ElementRef<'_>, min_chars: usize) -> Option<String> {
    scope
        .select(&PARAGRAPH)
        .map(element_text)
        .find(|text| is_bio_candidate(text, min_chars))
}

/// 论文栏目：标题优先于锚点，id 优先于文本
///
/// 导航、页眉、页脚中的锚点不算栏目
fn find_publication_section(root: ElementRef<'_>) -> Option<ElementRef<'_>> {
    RuleChain::<ElementRef<'_>, ElementRef<'_>>::new("publications")
        .rule("标题 id", |r| r.select(&HEADINGS).find(id_matches))
        .rule("标题文本", |r| r.select(&HEADINGS).find(text_matches))
        .rule("锚点 id", |r| {
            r.select(&ANCHORS).find(|a| id_matches(a) && !in_page_chrome(*a))
        })
        .rule("锚点文本", |r| {
            r.select(&ANCHORS).find(|a| text_matches(a) && !in_page_chrome(*a))
        })
        .first_match(&root)
}

fn id_matches(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .attr("id")
        .or_else(|| element.value().attr("name"))
        .is_some_and(|id| PUBLICATIONS.is_match(id))
}

fn text_matches(element: &ElementRef<'_>) -> bool {
    PUBLICATIONS.is_match(&element_text(*element))
}

/// 是否位于导航、页眉或页脚
fn in_page_chrome(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "nav" | "header" | "footer"))
}

/// 兄弟元素本身是标题或含标题，即下一个栏目开始
fn starts_new_section(element: ElementRef<'_>) -> bool {
    HEADINGS.matches(&element) || element.select(&HEADINGS).next().is_some()
}
