//! multipart 表单读取

use actix_multipart::Multipart;
use futures_util::TryStreamExt;

use super::upload_filter::{IncomingFile, UploadRejection};

/// 读取唯一的文件字段到内存
///
/// 超过 `max_size` 立即停止读取；出现第二个同名字段时拒绝。其它字段被丢弃。
pub async fn read_single_file(
    mut payload: Multipart,
    field_name: &str,
    max_size: usize,
) -> Result<Option<IncomingFile>, UploadRejection> {
    let mut file: Option<IncomingFile> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadRejection::Malformed(e.to_string()))?
    {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != field_name {
            // 丢弃非文件字段
            while field
                .try_next()
                .await
                .map_err(|e| UploadRejection::Malformed(e.to_string()))?
                .is_some()
            {}
            continue;
        }

        if file.is_some() {
            return Err(UploadRejection::MultipleFiles);
        }

        let original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let mime_type = field
            .content_type()
            .map(|ct| ct.essence_str().to_string())
            .unwrap_or_default();

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| UploadRejection::Malformed(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_size {
                return Err(UploadRejection::TooLarge {
                    size: bytes.len() + chunk.len(),
                    max: max_size,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        file = Some(IncomingFile {
            original_name,
            mime_type,
            bytes,
        });
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::PayloadError;
    use actix_web::http::header::{self, HeaderMap, HeaderValue};
    use actix_web::web::Bytes;

    const BOUNDARY: &str = "eduhub-form-boundary";

    enum Part<'a> {
        File(&'a str, &'a str, &'a [u8]),
        Text(&'a str, &'a str),
    }

    fn form(parts: &[Part<'_>]) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File(name, filename, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/pdf\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        let stream = futures_util::stream::once(async move {
            Ok::<Bytes, PayloadError>(Bytes::from(body))
        });
        Multipart::new(&headers, stream)
    }

    #[actix_web::test]
    async fn test_reads_file_field() {
        let payload = form(&[
            Part::Text("comment", "late again"),
            Part::File("file", "hw.pdf", b"%PDF-1.4 essay"),
        ]);
        let file = read_single_file(payload, "file", 1024).await.unwrap().unwrap();
        assert_eq!(file.original_name, "hw.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.bytes, b"%PDF-1.4 essay");
    }

    #[actix_web::test]
    async fn test_oversized_file_stops_reading() {
        let payload = form(&[Part::File("file", "big.pdf", &[b'x'; 64])]);
        let err = read_single_file(payload, "file", 16).await.unwrap_err();
        assert!(matches!(err, UploadRejection::TooLarge { max: 16, .. }));
    }

    #[actix_web::test]
    async fn test_second_file_part_is_rejected() {
        let payload = form(&[
            Part::File("file", "a.pdf", b"%PDF-1.4 a"),
            Part::File("file", "b.pdf", b"%PDF-1.4 b"),
        ]);
        let err = read_single_file(payload, "file", 1024).await.unwrap_err();
        assert!(matches!(err, UploadRejection::MultipleFiles));
    }

    #[actix_web::test]
    async fn test_form_without_file_field() {
        let payload = form(&[Part::Text("comment", "forgot the attachment")]);
        assert!(read_single_file(payload, "file", 1024).await.unwrap().is_none());
    }
}
