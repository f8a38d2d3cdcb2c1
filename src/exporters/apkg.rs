//! `.apkg` 打包
//!
//! 一个 `.apkg` 是 zip：
//! - `collection.anki2`: SQLite 集合库（schema v11）
//! - `media`: JSON 映射 `{"0": "文件名", ...}`
//! - `0`, `1`, ...: 媒体文件本体

use super::deck::{DeckPackage, DeckWriter};
use crate::error::ExportError;
use crate::utils::fs::output_tempfile;
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use scraper::Html;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 集合库在包内的文件名
pub const COLLECTION_ENTRY: &str = "collection.anki2";
/// 媒体映射在包内的文件名
pub const MEDIA_ENTRY: &str = "media";

/// 笔记字段分隔符
const FIELD_SEPARATOR: &str = "\x1f";

const SCHEMA: &str = r#"
CREATE TABLE col (
    id integer primary key, crt integer not null, mod integer not null,
    scm integer not null, ver integer not null, dty integer not null,
    usn integer not null, ls integer not null, conf text not null,
    models text not null, decks text not null, dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key, guid text not null, mid integer not null,
    mod integer not null, usn integer not null, tags text not null,
    flds text not null, sfld integer not null, csum integer not null,
    flags integer not null, data text not null
);
CREATE TABLE cards (
    id integer primary key, nid integer not null, did integer not null,
    ord integer not null, mod integer not null, usn integer not null,
    type integer not null, queue integer not null, due integer not null,
    ivl integer not null, factor integer not null, reps integer not null,
    lapses integer not null, left integer not null, odue integer not null,
    odid integer not null, flags integer not null, data text not null
);
CREATE TABLE revlog (
    id integer primary key, cid integer not null, usn integer not null,
    ease integer not null, ivl integer not null, lastIvl integer not null,
    factor integer not null, time integer not null, type integer not null
);
CREATE TABLE graves (usn integer not null, oid integer not null, type integer not null);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
"#;

/// 基于 SQLite + zip 的卡组打包器
#[derive(Debug, Default, Clone, Copy)]
pub struct ApkgWriter;

impl ApkgWriter {
    pub fn new() -> Self {
        Self
    }
}

impl DeckWriter for ApkgWriter {
    fn write(&self, package: &DeckPackage, path: &Path) -> Result<(), ExportError> {
        // 先读媒体：任何一个缺失都放弃打包，不写半成品
        let media = read_media(&package.media)?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let persist_error = |source: std::io::Error| ExportError::Persist {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(persist_error)?;

        let workdir = tempfile::tempdir().map_err(persist_error)?;
        let collection_path = workdir.path().join(COLLECTION_ENTRY);
        write_collection(package, &collection_path)?;
        let collection = std::fs::read(&collection_path).map_err(persist_error)?;

        let tmp = output_tempfile(dir).map_err(persist_error)?;
        let tmp = write_archive(tmp, &collection, &media)?;
        tmp.persist(path).map_err(|e| persist_error(e.error))?;

        info!(
            "✓ 卡组已写入: {} ({} 张卡片, {} 个媒体文件)",
            path.display(),
            package.deck.notes.len(),
            media.len()
        );
        Ok(())
    }
}

/// 读取全部媒体文件：(包内文件名, 内容)
fn read_media(paths: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>, ExportError> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|source| ExportError::Media {
                path: path.display().to_string(),
                source,
            })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Ok((name, bytes))
        })
        .collect()
}

/// 生成集合库
fn write_collection(package: &DeckPackage, path: &Path) -> Result<(), ExportError> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let now_ms = chrono::Utc::now().timestamp_millis();
    let now_secs = now_ms / 1000;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO col VALUES (1, ?1, ?2, ?3, 11, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
        params![
            now_secs,
            now_ms,
            now_ms,
            collection_conf(package).to_string(),
            models_json(package, now_secs).to_string(),
            decks_json(package, now_secs).to_string(),
            dconf_json().to_string(),
        ],
    )?;

    for (index, note) in package.deck.notes.iter().enumerate() {
        let note_id = now_ms + index as i64;
        let sfld = note.fields.get(1).map(|f| sort_field(f)).unwrap_or_default();
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!(" {} ", note.tags.join(" "))
        };

        tx.execute(
            "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, ?5, ?6, ?7, ?8, 0, '')",
            params![
                note_id,
                note.guid,
                package.note_type.id,
                now_secs,
                tags,
                note.fields.join(FIELD_SEPARATOR),
                sfld,
                field_checksum(&sfld),
            ],
        )?;
        tx.execute(
            "INSERT INTO cards VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            params![
                note_id,
                note_id,
                package.deck.id,
                now_secs,
                index as i64 + 1
            ],
        )?;
    }
    tx.commit()?;

    conn.close().map_err(|(_, e)| e)?;
    debug!("集合库已生成: {}", path.display());
    Ok(())
}

/// 写 zip 包到临时文件
fn write_archive(
    file: NamedTempFile,
    collection: &[u8],
    media: &[(String, Vec<u8>)],
) -> Result<NamedTempFile, ExportError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(file);

    zip.start_file(COLLECTION_ENTRY, options)?;
    zip.write_all(collection).map_err(zip::result::ZipError::from)?;

    let mapping: BTreeMap<String, &str> = media
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (i.to_string(), name.as_str()))
        .collect();
    zip.start_file(MEDIA_ENTRY, options)?;
    zip.write_all(serde_json::to_string(&mapping)?.as_bytes())
        .map_err(zip::result::ZipError::from)?;

    for (i, (_, bytes)) in media.iter().enumerate() {
        zip.start_file(i.to_string(), options)?;
        zip.write_all(bytes).map_err(zip::result::ZipError::from)?;
    }

    Ok(zip.finish()?)
}

/// 排序字段：去掉标签并还原实体，与 Anki 的 `sfld` 一致
fn sort_field(field: &str) -> String {
    Html::parse_fragment(field).root_element().text().collect()
}

/// 排序字段校验和：sha1 前 4 字节，Anki 靠它判断重复笔记
fn field_checksum(sort_field: &str) -> i64 {
    let digest = Sha1::digest(sort_field.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn collection_conf(package: &DeckPackage) -> Value {
    json!({
        "activeDecks": [1],
        "curDeck": package.deck.id,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": package.note_type.id.to_string(),
        "nextPos": package.deck.notes.len() + 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true
    })
}

fn models_json(package: &DeckPackage, now_secs: i64) -> Value {
    let note_type = &package.note_type;
    let fields: Vec<Value> = note_type
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "name": name,
                "ord": ord,
                "sticky": false,
                "rtl": false,
                "font": "Arial",
                "size": 20,
                "media": []
            })
        })
        .collect();

    json!({
        note_type.id.to_string(): {
            "id": note_type.id,
            "name": note_type.name,
            "type": 0,
            "mod": now_secs,
            "usn": -1,
            "sortf": 1,
            "did": package.deck.id,
            "tmpls": [{
                "name": note_type.template.name,
                "ord": 0,
                "qfmt": note_type.template.front,
                "afmt": note_type.template.back,
                "did": null,
                "bqfmt": "",
                "bafmt": ""
            }],
            "flds": fields,
            "css": note_type.css,
            "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
            "latexPost": "\\end{document}",
            "tags": [],
            "vers": [],
            "req": [[0, "any", [0]]]
        }
    })
}

fn decks_json(package: &DeckPackage, now_secs: i64) -> Value {
    let deck = |id: i64, name: &str, desc: &str| {
        json!({
            "id": id,
            "name": name,
            "desc": desc,
            "mod": now_secs,
            "usn": -1,
            "collapsed": false,
            "browserCollapsed": false,
            "dyn": 0,
            "conf": 1,
            "extendNew": 0,
            "extendRev": 0,
            "newToday": [0, 0],
            "revToday": [0, 0],
            "lrnToday": [0, 0],
            "timeToday": [0, 0]
        })
    };

    json!({
        "1": deck(1, "Default", ""),
        package.deck.id.to_string(): deck(package.deck.id, &package.deck.name, &package.deck.description)
    })
}

fn dconf_json() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "delays": [1, 10],
                "ints": [1, 4, 7],
                "initialFactor": 2500,
                "order": 1,
                "perDay": 20,
                "bury": true,
                "separate": true
            },
            "rev": {
                "perDay": 200,
                "ease4": 1.3,
                "fuzz": 0.05,
                "maxIvl": 36500,
                "ivlFct": 1,
                "bury": true,
                "minSpace": 1
            },
            "lapse": {
                "delays": [10],
                "mult": 0,
                "minInt": 1,
                "leechFails": 8,
                "leechAction": 0
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::exporters::deck::build_package;
    use crate::models::FacultyRecord;
    use std::io::Read;
    use url::Url;

    fn record(slug: &str, filename: Option<&str>) -> FacultyRecord {
        FacultyRecord {
            identity: Url::parse(&format!("https://www.example.edu/{slug}")).unwrap(),
            name: format!("Prof {slug}"),
            title: "Professor of Law".to_string(),
            bio: "Bio".to_string(),
            publications: vec![],
            image_url: None,
            image_filename: filename.map(str::to_string),
        }
    }

    #[test]
    fn test_writes_collection_and_media() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_tests("https://www.example.edu/list", dir.path());
        std::fs::create_dir_all(config.media_dir()).unwrap();
        std::fs::write(config.media_dir().join("a.jpg"), b"jpeg").unwrap();

        let records = vec![record("a", Some("a.jpg")), record("b", None)];
        let package = build_package(&records, &config);
        let path = config.apkg_path();

        ApkgWriter::new().write(&package, &path).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        let mut mapping = String::new();
        archive
            .by_name(MEDIA_ENTRY)
            .unwrap()
            .read_to_string(&mut mapping)
            .unwrap();
        assert_eq!(mapping, r#"{"0":"a.jpg"}"#);

        let mut image = Vec::new();
        archive.by_name("0").unwrap().read_to_end(&mut image).unwrap();
        assert_eq!(image, b"jpeg");

        let mut collection = Vec::new();
        archive
            .by_name(COLLECTION_ENTRY)
            .unwrap()
            .read_to_end(&mut collection)
            .unwrap();
        let db_path = dir.path().join("extracted.anki2");
        std::fs::write(&db_path, collection).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let notes: i64 = conn
            .query_row("SELECT count(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        let cards: i64 = conn
            .query_row("SELECT count(*) FROM cards", [], |row| row.get(0))
            .unwrap();
        let tags: String = conn
            .query_row("SELECT tags FROM notes ORDER BY id LIMIT 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(notes, 2);
        assert_eq!(cards, 2);
        assert_eq!(tags, " gwlaw full-time-faculty p ");

        let (sfld, csum): (String, i64) = conn
            .query_row("SELECT sfld, csum FROM notes ORDER BY id LIMIT 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(sfld, "Prof a");
        assert_eq!(csum, field_checksum("Prof a"));
    }

    #[test]
    fn test_sort_field_matches_anki_checksum() {
        let field = sort_field("Ann O&#39;Brien &amp; Co");

        assert_eq!(field, "Ann O'Brien & Co");
        assert_eq!(field_checksum(&field), 886555211);
    }

    #[test]
    fn test_missing_media_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_tests("https://www.example.edu/list", dir.path());

        let package = build_package(&[record("a", Some("gone.jpg"))], &config);
        let path = config.apkg_path();

        let err = ApkgWriter::new().write(&package, &path).unwrap_err();

        assert!(matches!(err, ExportError::Media { .. }));
        assert!(!path.exists());
    }
}
