//! CSV 导出
//!
//! 最低保障的输出：只要记录合法就必须成功

use crate::error::{AppError, AppResult, ExportError};
use crate::models::FacultyRecord;
use crate::utils::fs::output_tempfile;
use std::path::Path;
use tracing::info;

/// 论文之间的分隔符
pub const PUBLICATION_SEPARATOR: &str = " • ";

/// 表头（固定列）
pub const CSV_HEADERS: [&str; 7] = [
    "FrontImage",
    "Name",
    "Title",
    "Bio",
    "Publications",
    "SourceURL",
    "ImageSource",
];

/// 单条记录对应的一行
pub fn csv_row(record: &FacultyRecord) -> [String; 7] {
    [
        record.image_filename.clone().unwrap_or_default(),
        record.name.clone(),
        record.title.clone(),
        record.bio.clone(),
        record.publications.join(PUBLICATION_SEPARATOR),
        record.identity.to_string(),
        record
            .image_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
    ]
}

/// 写出 CSV（写临时文件后重命名，失败时不留下半成品）
///
/// # 参数
/// - `records`: 最终记录（顺序即输出顺序）
/// - `path`: 输出路径
pub fn write_csv(records: &[FacultyRecord], path: &Path) -> AppResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))?;

    let csv_error = |source: csv::Error| ExportError::Csv {
        path: path.display().to_string(),
        source,
    };

    let tmp = output_tempfile(dir).map_err(|e| AppError::io(dir, e))?;
    let mut writer = csv::Writer::from_writer(tmp);
    writer.write_record(CSV_HEADERS).map_err(csv_error)?;
    for record in records {
        writer.write_record(csv_row(record)).map_err(csv_error)?;
    }

    let tmp = writer
        .into_inner()
        .map_err(|e| AppError::io(path, e.into_error()))?;
    tmp.persist(path).map_err(|e| ExportError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;

    info!("✓ CSV 已写入: {} ({} 条)", path.display(), records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn record(name: &str, image: Option<&str>) -> FacultyRecord {
        FacultyRecord {
            identity: Url::parse(&format!("https://www.example.edu/{}", name.to_lowercase())).unwrap(),
            name: name.to_string(),
            title: "Professor of Law, Emerita".to_string(),
            bio: "Writes about \"agency\" law.\nSecond line.".to_string(),
            publications: vec!["One".to_string(), "Two".to_string()],
            image_url: image.map(|u| Url::parse(u).unwrap()),
            image_filename: image.map(|_| "abc.jpg".to_string()),
        }
    }

    #[test]
    fn test_row_without_image_has_empty_fields() {
        let row = csv_row(&record("Jane", None));
        assert_eq!(row[0], "");
        assert_eq!(row[4], "One • Two");
        assert_eq!(row[6], "");
    }

    #[test]
    fn test_write_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("faculty.csv");
        let records = vec![
            record("Jane", Some("https://www.example.edu/jane.jpg")),
            record("John", None),
        ];

        write_csv(&records, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADERS.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "abc.jpg");
        assert_eq!(&rows[0][1], "Jane");
        assert_eq!(&rows[0][2], "Professor of Law, Emerita");
        assert_eq!(&rows[0][3], "Writes about \"agency\" law.\nSecond line.");
        assert_eq!(&rows[1][0], "");
        assert_eq!(&rows[1][5], "https://www.example.edu/john");
    }

    #[cfg(unix)]
    #[test]
    fn test_written_csv_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faculty.csv");

        write_csv(&[record("Jane", None)], &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
