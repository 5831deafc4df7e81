use std::path::{Path, PathBuf};

/// 文件附件
///
/// 记录表单字段名、上传时展示的文件名和本地文件路径，创建后不可修改。
/// 文件仅在发送请求时才会被打开。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    field_name: String,
    display_name: String,
    source_path: PathBuf,
}

impl FileAttachment {
    /// 创建文件附件
    #[inline]
    pub fn new(
        field_name: impl Into<String>,
        display_name: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            display_name: display_name.into(),
            source_path: source_path.into(),
        }
    }

    /// 表单字段名
    #[inline]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// 上传时展示的文件名
    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// 本地文件路径
    #[inline]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}
