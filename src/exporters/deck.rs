//! 卡组导出
//!
//! 把最终记录投影成一个卡组包：固定的笔记类型 + 单个卡组 + 媒体文件列表。
//! 具体的打包格式由 `DeckWriter` 实现

use crate::config::Config;
use crate::error::ExportError;
use crate::models::FacultyRecord;
use crate::utils::text::escape_html;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// 笔记类型版本，字段或模板变更时递增
pub const NOTE_TYPE_VERSION: u32 = 2;

/// 笔记字段（顺序即卡片字段顺序）
pub const NOTE_FIELDS: [&str; 6] = [
    "FrontImage",
    "Name",
    "Title",
    "Bio",
    "Publications",
    "SourceURL",
];

const FRONT_TEMPLATE: &str = "<div style='text-align:center;'>{{FrontImage}}</div>";

const BACK_TEMPLATE: &str = "{{FrontSide}}<hr>\
<h2>{{Name}}</h2>\
<div><i>{{Title}}</i></div>\
<div style='margin-top:8px;'>{{Bio}}</div>\
{{#Publications}}<div style='margin-top:8px;'><b>Recent publications</b><ul>{{Publications}}</ul></div>{{/Publications}}\
<div style='margin-top:8px;'><a href='{{SourceURL}}'>Profile</a></div>";

const CARD_CSS: &str = ".card { font-family: -apple-system, Segoe UI, Roboto, Helvetica, Arial; font-size: 16px; } \
img { max-width: 100%; height:auto; }";

/// 卡片模板（正面 + 背面）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    pub name: String,
    pub front: String,
    pub back: String,
}

/// 笔记类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteType {
    pub id: i64,
    pub name: String,
    pub version: u32,
    pub fields: Vec<String>,
    pub template: CardTemplate,
    pub css: String,
}

/// 一条笔记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckNote {
    /// 由身份键派生，重复运行保持不变
    pub guid: String,
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

/// 卡组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub notes: Vec<DeckNote>,
}

/// 待写出的完整卡组包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckPackage {
    pub note_type: NoteType,
    pub deck: Deck,
    /// 随包附带的媒体文件
    pub media: Vec<PathBuf>,
}

/// 卡组打包能力
pub trait DeckWriter {
    /// 把卡组包写到 `path`
    fn write(&self, package: &DeckPackage, path: &Path) -> Result<(), ExportError>;
}

/// 固定的笔记类型
pub fn note_type(config: &Config) -> NoteType {
    NoteType {
        id: config.model_id,
        name: format!("Faculty Photo→Back v{}", NOTE_TYPE_VERSION),
        version: NOTE_TYPE_VERSION,
        fields: NOTE_FIELDS.iter().map(|f| f.to_string()).collect(),
        template: CardTemplate {
            name: "Card 1".to_string(),
            front: FRONT_TEMPLATE.to_string(),
            back: BACK_TEMPLATE.to_string(),
        },
        css: CARD_CSS.to_string(),
    }
}

/// 单条记录 → 笔记
pub fn note_for(record: &FacultyRecord, config: &Config) -> DeckNote {
    let front = record
        .image_filename
        .as_ref()
        .map(|f| format!("<img src=\"{}\" />", escape_html(f)))
        .unwrap_or_default();

    let publications: String = record
        .publications
        .iter()
        .map(|p| format!("<li>{}</li>", escape_html(p)))
        .collect();

    let mut tags = config.tags.clone();
    tags.push(record.initial_tag());

    DeckNote {
        guid: note_guid(record),
        fields: vec![
            front,
            escape_html(&record.name),
            escape_html(&record.title),
            escape_html(&record.bio),
            publications,
            escape_html(record.identity.as_str()),
        ],
        tags,
    }
}

/// 由身份键派生笔记 GUID
pub fn note_guid(record: &FacultyRecord) -> String {
    let digest = Sha256::digest(record.identity.as_str().as_bytes());
    hex::encode(&digest[..8])
}

/// 构建卡组包
///
/// # 参数
/// - `records`: 最终记录（顺序即笔记顺序）
/// - `config`: 卡组 id / 名称 / 标签 / 媒体目录
pub fn build_package(records: &[FacultyRecord], config: &Config) -> DeckPackage {
    let media_dir = config.media_dir();

    DeckPackage {
        note_type: note_type(config),
        deck: Deck {
            id: config.deck_id,
            name: config.deck_name.clone(),
            description: String::new(),
            notes: records.iter().map(|r| note_for(r, config)).collect(),
        },
        media: records
            .iter()
            .filter_map(|r| r.image_filename.as_ref())
            .map(|f| media_dir.join(f))
            .collect(),
    }
}

/// 构建并写出卡组包
pub fn export_deck(
    records: &[FacultyRecord],
    config: &Config,
    writer: &impl DeckWriter,
    path: &Path,
) -> Result<(), ExportError> {
    let package = build_package(records, config);
    writer.write(&package, path)
}
