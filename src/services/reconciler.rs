//! 合并去重服务 - 业务能力层
//!
//! - 按主页 URL 去重（跨页以最先出现者为准）
//! - 合并列表条目与个人主页数据

use crate::models::{FacultyRecord, ListingEntry, ProfileRecord};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// 合并去重服务
#[derive(Debug, Default)]
pub struct Reconciler {
    seen: HashSet<Url>,
    entries: Vec<ListingEntry>,
    duplicates: usize,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一条列表条目
    ///
    /// # 返回
    /// 首次出现返回 true；重复出现时丢弃并返回 false
    pub fn add(&mut self, entry: ListingEntry) -> bool {
        if self.seen.insert(entry.profile_url.clone()) {
            self.entries.push(entry);
            true
        } else {
            debug!("跨页重复，保留首次出现: {}", entry.profile_url);
            self.duplicates += 1;
            false
        }
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ListingEntry>) {
        for entry in entries {
            self.add(entry);
        }
    }

    /// 去重后的条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 被丢弃的重复条目数
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// 按首次出现顺序取出去重后的条目
    pub fn into_entries(self) -> Vec<ListingEntry> {
        self.entries
    }

    /// 合并列表条目与个人主页数据
    ///
    /// 规则：
    /// - title / image_url：主页非空优先，否则用列表
    /// - name：主页非空优先，否则用列表
    /// - bio / publications：只来自主页
    pub fn merge(entry: ListingEntry, profile: ProfileRecord) -> FacultyRecord {
        let mut record = FacultyRecord::from_listing(entry);

        if !profile.name.is_empty() {
            record.name = profile.name;
        }
        if !profile.title.is_empty() {
            record.title = profile.title;
        }
        if profile.image_url.is_some() {
            record.image_url = profile.image_url;
        }
        record.bio = profile.bio;
        record.publications = profile.publications;
        record
    }

    /// 记录数据缺口（不修正）
    pub fn report_gaps(record: &FacultyRecord) {
        if record.bio.is_empty() {
            warn!("⚠️ 缺少简介: {}", record.display_name());
        }
        if record.publications.is_empty() {
            warn!("⚠️ 缺少论文: {}", record.display_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, title: &str) -> ListingEntry {
        ListingEntry {
            name: format!("Name {slug}"),
            title: title.to_string(),
            profile_url: Url::parse(&format!("https://www.example.edu/{slug}")).unwrap(),
            thumbnail_url: Some(Url::parse(&format!("https://www.example.edu/{slug}.jpg")).unwrap()),
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut reconciler = Reconciler::new();
        reconciler.extend([
            entry("a", "page one"),
            entry("b", "page one"),
            entry("a", "page two"),
            entry("c", "page two"),
            entry("b", "page three"),
        ]);

        assert_eq!(reconciler.len(), 3);
        assert_eq!(reconciler.duplicates(), 2);

        let entries = reconciler.into_entries();
        let slugs: Vec<&str> = entries.iter().map(|e| e.profile_url.path()).collect();
        assert_eq!(slugs, vec!["/a", "/b", "/c"]);
        assert_eq!(entries[0].title, "page one");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let mut once = Reconciler::new();
        once.extend([entry("a", "t"), entry("a", "t"), entry("b", "t")]);
        let first = once.into_entries();

        let mut twice = Reconciler::new();
        twice.extend(first.clone());
        assert_eq!(twice.into_entries(), first);
    }

    #[test]
    fn test_profile_title_takes_precedence() {
        let profile = ProfileRecord {
            title: "Dean and Professor of Law".to_string(),
            ..Default::default()
        };

        let record = Reconciler::merge(entry("a", "Professor of Law"), profile);

        assert_eq!(record.title, "Dean and Professor of Law");
    }

    #[test]
    fn test_empty_profile_falls_back_to_listing() {
        let record = Reconciler::merge(entry("a", "Professor of Law"), ProfileRecord::default());

        assert_eq!(record.title, "Professor of Law");
        assert_eq!(record.name, "Name a");
        assert_eq!(
            record.image_url.as_ref().map(Url::as_str),
            Some("https://www.example.edu/a.jpg")
        );
        assert!(record.image_filename.is_none());
    }

    #[test]
    fn test_profile_image_and_content_win() {
        let profile = ProfileRecord {
            name: "Jane Q. Doe".to_string(),
            bio: "Long bio".to_string(),
            image_url: Some(Url::parse("https://www.example.edu/large.jpg").unwrap()),
            publications: vec!["Article One".to_string()],
            ..Default::default()
        };

        let record = Reconciler::merge(entry("a", "Professor"), profile);

        assert_eq!(record.name, "Jane Q. Doe");
        assert_eq!(record.bio, "Long bio");
        assert_eq!(record.publications, vec!["Article One"]);
        assert_eq!(
            record.image_url.as_ref().map(Url::as_str),
            Some("https://www.example.edu/large.jpg")
        );
    }
}
