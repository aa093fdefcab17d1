//! IO helper: 读取命令脚本文件

use std::{fs::File, io::{BufReader, Read}, path::Path};

use crate::model::data_core::AppError;

/// 从文件读取命令脚本全文
pub fn read_script_file(p: &Path) -> Result<String, AppError> {
    let f = File::open(p)?;
    let mut rdr = BufReader::new(f);
    let mut script = String::new();
    rdr.read_to_string(&mut script)?;
    Ok(script)
}
