//! 导出层
//!
//! - CSV：必须成功，失败即整次运行失败
//! - 卡组：尽力而为，失败时保留 CSV 并报告

pub mod apkg;
pub mod csv_export;
pub mod deck;

pub use apkg::ApkgWriter;
pub use csv_export::write_csv;
pub use deck::{build_package, export_deck, DeckPackage, DeckWriter};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::FacultyRecord;
use std::path::PathBuf;
use tracing::error;

/// 卡组导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckOutcome {
    /// 已写出
    Written(PathBuf),
    /// 打包失败（CSV 仍可用）
    Failed(String),
}

impl DeckOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, DeckOutcome::Written(_))
    }
}

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub csv_path: PathBuf,
    pub deck: DeckOutcome,
}

/// 写出 CSV 与卡组
///
/// # 参数
/// - `records`: 最终记录
/// - `config`: 输出路径与卡组配置
/// - `writer`: 卡组打包器
///
/// # 返回
/// CSV 写入失败时返回错误；卡组失败记录在 `ExportReport::deck`
pub fn export_all(
    records: &[FacultyRecord],
    config: &Config,
    writer: &impl DeckWriter,
) -> AppResult<ExportReport> {
    let csv_path = config.csv_path();
    write_csv(records, &csv_path)?;

    let apkg_path = config.apkg_path();
    let deck = match export_deck(records, config, writer, &apkg_path) {
        Ok(()) => DeckOutcome::Written(apkg_path),
        Err(e) => {
            error!("❌ 卡组打包失败: {}", e);
            println!("APKG 生成失败，CSV 可用: {}", csv_path.display());
            DeckOutcome::Failed(e.to_string())
        }
    };

    Ok(ExportReport { csv_path, deck })
}
