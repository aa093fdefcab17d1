//! VM桥接层：连接终端命令与AppState数据模型
//!
//! 每条命令最多触发一次状态替换，随后重新渲染大纲与实时预览。

use std::{
    cell::RefCell,
    io::{BufRead, Write},
    rc::Rc,
    str::FromStr,
    time::Instant,
};

use crate::model::{
    data_core::{AppError, AppState},
    outline::OutlineRow,
    performance::run_performance_suite,
    schema_tree::{FieldType, FieldUpdate},
};

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_ADDED: &str = "已添加字段";
pub const STATUS_UPDATED: &str = "已更新字段";
pub const STATUS_DELETED: &str = "已删除字段";
pub const STATUS_SUBMITTED: &str = "已提交（仅记录日志）";
pub const STATUS_EMPTY_TREE: &str = "（暂无字段，使用 add 添加）";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";
/// 大纲中展示的ID长度
pub const SHORT_ID_LEN: usize = 8;

pub const HELP_TEXT: &str = "\
命令:
  add                       在顶层追加字段
  child <id>                在 nested 字段下追加子字段
  name <id> [文本]          修改字段名（可为空）
  type <id> <类型|->        修改类型：string number float boolean objectId array nested，- 表示清空
  req <id> <on|off>         设置必填
  del <id>                  删除字段及其子树
  tree                      显示大纲
  preview [jsonpath]        显示预览文档或其中一个节点
  submit                    提交（仅记录日志）
  bench                     运行性能测试
  help                      显示帮助
  quit                      退出
<id> 可以是唯一前缀";

/// 终端命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add,
    Child(String),
    Name(String, String),
    Type(String, Option<FieldType>),
    Required(String, bool),
    Delete(String),
    Tree,
    Preview(Option<String>),
    Submit,
    Bench,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim_start()),
            None => (line, ""),
        };
        // 第一个参数是ID；ID后只吃掉一个分隔符，剩余部分原样作为值（名称可含首尾空格）
        let (target, value) = match rest.split_once(char::is_whitespace) {
            Some((target, value)) => (target, value),
            None => (rest, ""),
        };
        let need_target = || {
            if target.is_empty() {
                Err(AppError::Command(format!("{} 缺少节点ID", verb)))
            } else {
                Ok(target.to_string())
            }
        };

        match verb {
            "add" => Ok(Command::Add),
            "child" => Ok(Command::Child(need_target()?)),
            "name" => Ok(Command::Name(need_target()?, value.to_string())),
            "type" => {
                let target = need_target()?;
                match value.trim() {
                    "" => Err(AppError::Command("type 缺少类型".into())),
                    "-" => Ok(Command::Type(target, None)),
                    t => Ok(Command::Type(target, Some(t.parse::<FieldType>()?))),
                }
            }
            "req" => {
                let target = need_target()?;
                match value.trim() {
                    "on" | "true" => Ok(Command::Required(target, true)),
                    "off" | "false" => Ok(Command::Required(target, false)),
                    other => Err(AppError::Command(format!("req 需要 on/off，收到: {}", other))),
                }
            }
            "del" => Ok(Command::Delete(need_target()?)),
            "tree" => Ok(Command::Tree),
            "preview" => {
                let json_path = rest.trim();
                Ok(Command::Preview((!json_path.is_empty()).then(|| json_path.to_string())))
            }
            "submit" => Ok(Command::Submit),
            "bench" => Ok(Command::Bench),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(AppError::Command(format!("未知命令: {}", other))),
        }
    }
}

/// 渲染一行大纲
pub fn format_outline_row(row: &OutlineRow) -> String {
    let short_id: String = row.id.as_str().chars().take(SHORT_ID_LEN).collect();
    let name = if row.name.is_empty() { "<未命名>" } else { row.name.as_str() };
    let type_label = if row.type_label.is_empty() { "<未选类型>" } else { row.type_label.as_str() };
    let mut line = format!(
        "{}- [{}] {}: {}",
        "  ".repeat(row.depth as usize),
        short_id,
        name,
        type_label
    );
    if row.required {
        line.push_str(" *");
    }
    if row.inert_children > 0 {
        line.push_str(&format!(" (保留 {} 个子字段)", row.inert_children));
    }
    line
}

/// VM桥接器：管理命令与数据层的交互
pub struct ViewModelBridge {
    app_state: Rc<RefCell<AppState>>,
}

impl ViewModelBridge {
    pub fn new(app_state: Rc<RefCell<AppState>>) -> Self {
        Self { app_state }
    }

    /// 逐行读取命令直到 quit 或输入结束；空行与 `#` 注释被跳过
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<(), AppError> {
        writeln!(out, "{}", STATUS_READY)?;
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match line.trim_end_matches('\r').parse::<Command>() {
                Ok(Command::Quit) => {
                    tracing::info!("收到退出命令");
                    break;
                }
                Ok(command) => self.handle_command(command, out)?,
                Err(e) => {
                    tracing::warn!("命令解析失败: {}", e);
                    writeln!(out, "{}{}", STATUS_ERROR_PREFIX, e)?;
                }
            }
        }
        Ok(())
    }

    /// 执行一条命令；只有IO错误向上传播，其余错误写成状态行
    pub fn handle_command<W: Write>(&self, command: Command, out: &mut W) -> Result<(), AppError> {
        match self.apply(command, out) {
            Ok(()) => Ok(()),
            Err(AppError::Io(e)) => Err(AppError::Io(e)),
            Err(e) => {
                tracing::warn!("命令执行失败: {}", e);
                writeln!(out, "{}{}", STATUS_ERROR_PREFIX, e)?;
                Ok(())
            }
        }
    }

    fn apply<W: Write>(&self, command: Command, out: &mut W) -> Result<(), AppError> {
        match command {
            Command::Add => {
                let id = self.app_state.borrow_mut().add_root();
                writeln!(out, "{}: {}", STATUS_ADDED, id)?;
                self.render(out)
            }
            Command::Child(target) => {
                let parent = self.app_state.borrow().resolve_id(&target)?;
                let parent_type = self.app_state.borrow().node(&parent).and_then(|n| n.field_type());
                if parent_type != Some(FieldType::Nested) {
                    let label = parent_type.map(|t| t.to_string()).unwrap_or_else(|| "<未选类型>".into());
                    return Err(AppError::Command(format!(
                        "只能在 nested 字段下添加子字段，{} 的类型为 {}",
                        parent, label
                    )));
                }
                let added = self.app_state.borrow_mut().add_child(&parent);
                match added {
                    Some(id) => writeln!(out, "{}: {}", STATUS_ADDED, id)?,
                    None => return Err(AppError::NodeNotFound(target)),
                }
                self.render(out)
            }
            Command::Name(target, name) => self.update(&target, FieldUpdate::name(name), out),
            Command::Type(target, field_type) => {
                self.update(&target, FieldUpdate::field_type(field_type), out)
            }
            Command::Required(target, required) => {
                self.update(&target, FieldUpdate::required(required), out)
            }
            Command::Delete(target) => {
                let id = self.app_state.borrow().resolve_id(&target)?;
                self.app_state.borrow_mut().delete_field(&id);
                writeln!(out, "{}: {}", STATUS_DELETED, id)?;
                self.render(out)
            }
            Command::Tree => self.render_outline(out),
            Command::Preview(None) => self.render_preview(out),
            Command::Preview(Some(json_path)) => {
                let pretty = self.app_state.borrow().extract_preview_pretty(&json_path)?;
                writeln!(out, "{}", pretty)?;
                Ok(())
            }
            Command::Submit => {
                self.app_state.borrow().submit()?;
                writeln!(out, "{}", STATUS_SUBMITTED)?;
                Ok(())
            }
            Command::Bench => {
                let start = Instant::now();
                for result in run_performance_suite() {
                    writeln!(
                        out,
                        "{} {}: {}ms, {}",
                        if result.success { "✓" } else { "✗" },
                        result.operation,
                        result.duration_ms,
                        result.details
                    )?;
                }
                tracing::info!("性能测试完成，耗时: {}ms", start.elapsed().as_millis());
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{}", HELP_TEXT)?;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    fn update<W: Write>(&self, target: &str, update: FieldUpdate, out: &mut W) -> Result<(), AppError> {
        let id = self.app_state.borrow().resolve_id(target)?;
        // 惰性子树中的节点虽能解析，但更新无法到达
        if !self.app_state.borrow_mut().update_field(&id, update) {
            return Err(AppError::NodeNotFound(target.to_string()));
        }
        writeln!(out, "{}: {}", STATUS_UPDATED, id)?;
        self.render(out)
    }

    /// 状态变化后整体重新渲染
    fn render<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        self.render_outline(out)?;
        self.render_preview(out)
    }

    fn render_outline<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let rows = self.app_state.borrow().outline();
        if rows.is_empty() {
            writeln!(out, "{}", STATUS_EMPTY_TREE)?;
        }
        for row in &rows {
            writeln!(out, "{}", format_outline_row(row))?;
        }
        Ok(())
    }

    fn render_preview<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let pretty = self.app_state.borrow().preview_pretty()?;
        writeln!(out, "{}", pretty)?;
        Ok(())
    }
}
