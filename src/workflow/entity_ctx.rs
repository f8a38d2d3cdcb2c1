//! 教师处理上下文
//!
//! 封装"我正在处理第几位教师"这一信息

use std::fmt::Display;
use url::Url;

/// 教师处理上下文
#[derive(Debug, Clone)]
pub struct EntityCtx {
    /// 在去重后列表中的位置（从 1 开始）
    pub index: usize,

    /// 去重后的总人数
    pub total: usize,

    /// 身份键（个人主页 URL）
    pub identity: Url,
}

impl EntityCtx {
    pub fn new(index: usize, total: usize, identity: Url) -> Self {
        Self {
            index,
            total,
            identity,
        }
    }
}

impl Display for EntityCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[教师 {}/{}]", self.index, self.total)
    }
}
