//! HTML 辅助函数
//!
//! 封装 scraper 的常用操作：取文本、取属性、解析相对链接、向上查找容器

use crate::utils::text::clean_text;
use scraper::ElementRef;
use url::Url;

/// 元素子树的规整文本
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// 非空的规整文本
pub fn non_empty_text(element: ElementRef<'_>) -> Option<String> {
    Some(element_text(element)).filter(|t| !t.is_empty())
}

/// 读取属性并按页面 URL 解析为绝对地址
pub fn resolve_attr(element: ElementRef<'_>, attr: &str, base: &Url) -> Option<Url> {
    let raw = element.value().attr(attr)?.trim();
    if raw.is_empty() {
        return None;
    }
    base.join(raw).ok()
}

/// 父元素
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// 是否为 mailto 链接
pub fn is_mailto(href: &str) -> bool {
    href.trim().to_ascii_lowercase().starts_with("mailto:")
}
