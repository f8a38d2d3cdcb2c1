//! 输出文件的原子写入辅助

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// 输出文件权限：所有者读写，其他人只读
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// 在 `dir` 中创建临时文件，persist 后按普通输出文件的权限可读
///
/// tempfile 默认以 0600 创建，persist 会原样保留
pub fn output_tempfile(dir: &Path) -> io::Result<NamedTempFile> {
    let tmp = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))?;
    }
    Ok(tmp)
}
