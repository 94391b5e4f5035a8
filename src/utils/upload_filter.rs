//! 上传文件过滤
//!
//! 纯函数校验，在任何 I/O 之前执行。

use std::fmt;

use super::file_magic::validate_magic_bytes;
use crate::config::UploadConfig;
use crate::errors::EduHubError;
use crate::models::ErrorCode;

/// 已读入内存的上传文件
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// 上传策略
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_size: usize,
    pub allowed_types: Vec<String>,
}

impl UploadPolicy {
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_size: config.max_size,
            allowed_types: config.allowed_types.clone(),
        }
    }
}

/// 拒绝原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    Missing,
    Empty,
    TooLarge { size: usize, max: usize },
    TypeNotAllowed(String),
    ContentMismatch(String),
    MultipleFiles,
    Malformed(String),
}

impl UploadRejection {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            UploadRejection::Missing | UploadRejection::Empty => ErrorCode::FileMissing,
            UploadRejection::TooLarge { .. } => ErrorCode::FileSizeExceeded,
            UploadRejection::TypeNotAllowed(_) | UploadRejection::ContentMismatch(_) => {
                ErrorCode::FileTypeNotAllowed
            }
            UploadRejection::MultipleFiles => ErrorCode::MultifileUploadNotAllowed,
            UploadRejection::Malformed(_) => ErrorCode::BadRequest,
        }
    }
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::Missing => write!(f, "No file uploaded"),
            UploadRejection::Empty => write!(f, "Uploaded file is empty"),
            UploadRejection::TooLarge { size, max } => {
                write!(f, "File size {size} bytes exceeds the limit of {max} bytes")
            }
            UploadRejection::TypeNotAllowed(mime) => {
                write!(f, "File type '{mime}' is not allowed")
            }
            UploadRejection::ContentMismatch(mime) => {
                write!(f, "File content does not match declared type '{mime}'")
            }
            UploadRejection::MultipleFiles => write!(f, "Only one file may be uploaded"),
            UploadRejection::Malformed(reason) => write!(f, "Malformed multipart body: {reason}"),
        }
    }
}

impl From<UploadRejection> for EduHubError {
    fn from(rejection: UploadRejection) -> Self {
        EduHubError::validation(rejection.to_string())
    }
}

/// 校验上传文件
pub fn validate_upload(
    file: Option<&IncomingFile>,
    policy: &UploadPolicy,
) -> Result<(), UploadRejection> {
    let file = file.ok_or(UploadRejection::Missing)?;

    if file.bytes.is_empty() {
        return Err(UploadRejection::Empty);
    }
    if file.size() > policy.max_size {
        return Err(UploadRejection::TooLarge {
            size: file.size(),
            max: policy.max_size,
        });
    }
    if !policy.allows(&file.mime_type) {
        return Err(UploadRejection::TypeNotAllowed(file.mime_type.clone()));
    }
    if !validate_magic_bytes(&file.bytes, &file.mime_type) {
        return Err(UploadRejection::ContentMismatch(file.mime_type.clone()));
    }
    Ok(())
}
