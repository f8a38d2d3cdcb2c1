//! 媒体缓存服务 - 业务能力层
//!
//! 图片 URL → 本地文件。文件名只由 URL 决定，重复运行直接命中磁盘缓存

use crate::error::{AppError, AppResult};
use crate::infrastructure::{Fetcher, Pacer};
use crate::utils::fs::output_tempfile;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// 扩展名（含点）最多保留的字符数
const MAX_EXTENSION_CHARS: usize = 5;

/// 已缓存的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub path: PathBuf,
    pub filename: String,
    /// 本次调用是否实际下载
    pub downloaded: bool,
}

/// 由 URL 计算缓存文件名：sha256(URL) + 路径扩展名（最多 5 个字符，含点）
pub fn cache_filename(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let extension = Path::new(url.path())
        .extension()
        .map(|ext| {
            format!(".{}", ext.to_string_lossy())
                .chars()
                .take(MAX_EXTENSION_CHARS)
                .collect::<String>()
        })
        .unwrap_or_default();
    format!("{}{}", hex::encode(digest), extension)
}

/// 媒体缓存服务
///
/// 职责：
/// - 命中缓存时直接返回，不发请求
/// - 未命中时下载并写入（先写临时文件再原子重命名）
/// - 无 URL 时返回 None
pub struct MediaCache<'a, F: Fetcher> {
    fetcher: &'a F,
    dir: PathBuf,
    pacer: Pacer,
}

impl<'a, F: Fetcher> MediaCache<'a, F> {
    /// 创建媒体缓存（目录不存在时创建）
    pub fn new(fetcher: &'a F, dir: impl Into<PathBuf>, pacer: Pacer) -> AppResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| AppError::io(&dir, e))?;
        Ok(Self {
            fetcher,
            dir,
            pacer,
        })
    }

    /// 解析图片到本地文件
    ///
    /// # 返回
    /// - `Ok(None)`: 没有图片
    /// - `Ok(Some(image))`: 本地文件已就绪
    /// - `Err(_)`: 下载或写入失败
    pub async fn resolve(&self, url: Option<&Url>) -> AppResult<Option<CachedImage>> {
        let Some(url) = url else {
            return Ok(None);
        };

        let filename = cache_filename(url);
        let path = self.dir.join(&filename);

        if path.is_file() {
            debug!("图片已缓存: {}", path.display());
            return Ok(Some(CachedImage {
                path,
                filename,
                downloaded: false,
            }));
        }

        info!("⬇️ 下载图片: {}", url);
        let response = self.fetcher.fetch(url).await?;
        self.write_atomically(&path, &response.body)?;
        self.pacer.pause().await;

        Ok(Some(CachedImage {
            path,
            filename,
            downloaded: true,
        }))
    }

    /// 写临时文件后重命名，失败时临时文件随 drop 删除
    fn write_atomically(&self, path: &Path, bytes: &[u8]) -> AppResult<()> {
        let mut tmp = output_tempfile(&self.dir).map_err(|e| AppError::io(&self.dir, e))?;
        tmp.write_all(bytes).map_err(|e| AppError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| AppError::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| AppError::io(path, e.error))?;
        Ok(())
    }
}
