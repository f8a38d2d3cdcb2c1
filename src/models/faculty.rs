use url::Url;

/// 列表页卡片解析出的教师条目
///
/// `profile_url` 是身份键，合并后即丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub title: String,
    pub profile_url: Url,
    pub thumbnail_url: Option<Url>,
}

/// 个人主页解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRecord {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image_url: Option<Url>,
    /// 最多 3 条
    pub publications: Vec<String>,
}

/// 合并后的教师记录，导出的最小单位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyRecord {
    /// 身份键（个人主页 URL），在输出集合中唯一
    pub identity: Url,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub publications: Vec<String>,
    pub image_url: Option<Url>,
    /// 媒体缓存中的文件名；一旦设置，对应文件必然存在
    pub image_filename: Option<String>,
}

impl FacultyRecord {
    /// 只有列表数据时的记录
    pub fn from_listing(entry: ListingEntry) -> Self {
        Self {
            identity: entry.profile_url,
            name: entry.name,
            title: entry.title,
            bio: String::new(),
            publications: Vec::new(),
            image_url: entry.thumbnail_url,
            image_filename: None,
        }
    }

    /// 日志里显示的名字，没有名字时退回 URL
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.identity.as_str()
        } else {
            &self.name
        }
    }

    /// 卡片标签用的首字母（小写），没有名字时为 `_`
    pub fn initial_tag(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect())
            .unwrap_or_else(|| "_".to_string())
    }
}
