//! 程序入口：初始化日志，创建状态与VM桥接器，从标准输入或脚本文件读取命令

use std::{cell::RefCell, io::{self, Cursor}, path::PathBuf, rc::Rc};

use tracing_subscriber::fmt::SubscriberBuilder;

use schema_builder::{utils::fs::read_script_file, AppState, ViewModelBridge};

fn main() -> anyhow::Result<()> {
    // 初始化日志输出（写到stderr，stdout只留给渲染结果）
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .with_writer(io::stderr)
        .try_init();

    let state = Rc::new(RefCell::new(AppState::default()));
    let bridge = ViewModelBridge::new(state.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(script_path) => {
            let script = read_script_file(&script_path)?;
            tracing::info!("执行脚本: {}", script_path.display());
            bridge.run(Cursor::new(script), &mut out)?;
        }
        None => {
            tracing::info!("应用启动成功，输入 help 查看命令");
            bridge.run(io::stdin().lock(), &mut out)?;
        }
    }

    tracing::info!("退出，最终共 {} 个字段", state.borrow().node_count());
    Ok(())
}
