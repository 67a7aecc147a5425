use crate::domain::model::AddressList;
use crate::utils::error::{Result, ValidatorError};

const UTF8_BOM: &str = "\u{feff}";

/// 將上傳檔案的位元組解碼為文字，非 UTF-8 的位元組以替代字元處理
pub fn decode_input(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix(UTF8_BOM).unwrap_or(&*text).to_string()
}

/// 逐行擷取地址：修剪空白、丟棄空行，保留重複項目
pub fn extract_addresses(text: impl Into<String>) -> Result<AddressList> {
    let addresses = AddressList::from_text(text);
    if addresses.is_empty() {
        return Err(ValidatorError::EmptyInput);
    }
    tracing::debug!("Extracted {} candidate addresses", addresses.len());
    Ok(addresses)
}
