use bytes::Bytes;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file uploaded alongside a publish or batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAttachment {
    filename: String,
    data: Bytes,
    content_type: Option<String>,
}

impl BinaryAttachment {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { filename: filename.into(), data: data.into(), content_type: None }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Multipart field name; batch requests refer to attachments by it.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// The explicit content type, or one sniffed from the leading bytes.
    pub fn resolved_content_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            infer::get(&self.data)
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_content_type_is_sniffed_from_png_header() {
        let fixture = BinaryAttachment::new(
            "cat.png",
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0],
        );
        assert_eq!(fixture.resolved_content_type(), "image/png");
    }

    #[test]
    fn test_content_type_falls_back_to_octet_stream() {
        let fixture = BinaryAttachment::new("notes.bin", b"plain".to_vec());
        assert_eq!(fixture.resolved_content_type(), "application/octet-stream");
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let fixture = BinaryAttachment::new("clip", b"data".to_vec()).content_type("video/mp4");
        assert_eq!(fixture.resolved_content_type(), "video/mp4");
    }
}
