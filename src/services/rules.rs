//! 字段提取规则链
//!
//! 每个字段的提取拆成一组按优先级排列的独立规则，
//! 依次尝试，第一个返回 `Some` 的规则胜出

use tracing::trace;

/// 单条规则：名称 + 提取函数
pub struct Rule<'r, C, T> {
    name: &'static str,
    apply: Box<dyn Fn(&C) -> Option<T> + 'r>,
}

/// 按优先级排列的规则链
pub struct RuleChain<'r, C, T> {
    field: &'static str,
    rules: Vec<Rule<'r, C, T>>,
}

impl<'r, C, T> RuleChain<'r, C, T> {
    /// 创建空规则链
    ///
    /// # 参数
    /// - `field`: 字段名（仅用于日志）
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    /// 追加一条规则（优先级低于已有规则）
    pub fn rule(mut self, name: &'static str, apply: impl Fn(&C) -> Option<T> + 'r) -> Self {
        self.rules.push(Rule {
            name,
            apply: Box::new(apply),
        });
        self
    }

    /// 依次尝试，返回第一个命中的结果
    pub fn first_match(&self, ctx: &C) -> Option<T> {
        self.rules.iter().find_map(|rule| {
            let hit = (rule.apply)(ctx);
            if hit.is_some() {
                trace!("字段 {} 命中规则 {}", self.field, rule.name);
            }
            hit
        })
    }
}
