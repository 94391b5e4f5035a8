pub mod file_magic;
pub mod jwt;
pub mod multipart;
pub mod parameter_error_handler;
pub mod password;
pub mod sql;
pub mod upload_filter;
pub mod validate;

pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::{json_error_handler, path_error_handler, query_error_handler};
pub use sql::escape_like_pattern;
pub use upload_filter::{IncomingFile, UploadPolicy, UploadRejection, validate_upload};
