/// 待分析的课本照片
///
/// 上传时编码，开始分析时被消费一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    /// 原始文件名（仅用于日志显示）
    pub file_name: String,
    pub mime_type: String,
    /// base64 编码的图片数据
    pub data: String,
}

impl PendingImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// 编码后的长度（字节）
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}
