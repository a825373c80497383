//! IO helper: raw text file read/write

use std::{fs, path::Path};

use crate::model::data_core::AppError;

/// 读入文件的原始文本
pub fn read_text_file(p: &Path) -> Result<String, AppError> {
    let text = fs::read_to_string(p)?;
    Ok(text)
}

/// 将格式化文本写入文件
pub fn write_text_file(p: &Path, text: &str) -> Result<(), AppError> {
    fs::write(p, text)?;
    Ok(())
}
