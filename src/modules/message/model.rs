use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::error,
    modules::{
        account::schema::Role,
        message::schema::MessageKind,
    },
};

/// Attachment metadata handed back by the external upload store. The core
/// never sees the bytes, only this record.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta {
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub size: i64,
    pub mime_type: String,
}

/// MIME categories accepted for chat attachments: images, PDFs and common
/// document formats.
const ALLOWED_MIME: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

impl AttachmentMeta {
    /// Reject oversized or unsupported attachments before anything is
    /// persisted. The declared MIME type must be allowed and must agree
    /// with what the file name implies.
    pub fn check(&self, max_size: i64) -> Result<(), error::SystemError> {
        if self.size > max_size {
            return Err(error::SystemError::bad_request("Attachment is too large"));
        }

        if !ALLOWED_MIME.contains(&self.mime_type.as_str()) {
            return Err(error::SystemError::bad_request(
                "Invalid file type. Only images and documents are allowed.",
            ));
        }

        // Cross-check against the extension so a renamed binary cannot
        // sneak through with a friendly MIME type.
        let guessed = mime_guess::from_path(&self.name).first_raw();
        match guessed {
            Some(guess) if ALLOWED_MIME.contains(&guess) => Ok(()),
            _ => Err(error::SystemError::bad_request(
                "Invalid file type. Only images and documents are allowed.",
            )),
        }
    }

    /// The message kind this attachment implies.
    pub fn kind(&self) -> MessageKind {
        if self.mime_type.starts_with("image/") {
            MessageKind::Image
        } else {
            MessageKind::Document
        }
    }
}

/// Upper bound on the chat body, counted in characters.
pub const MAX_BODY_CHARS: usize = 4000;

/// Body bounds shared by every entry point; the channel path has no
/// extractor in front of it, so the service re-checks here.
pub fn check_body(body: &str) -> Result<(), error::SystemError> {
    if body.is_empty() {
        return Err(error::SystemError::bad_request("Message body must not be empty"));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(error::SystemError::bad_request("Message body is too long"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub appointment_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
    #[validate(nested)]
    pub attachment: Option<AttachmentMeta>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub conversation_id: Uuid,
    pub appointment_id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: Role,
    pub receiver_id: Uuid,
    pub receiver_role: Role,
    pub body: String,
    pub kind: MessageKind,
    pub attachment: Option<AttachmentMeta>,
}

/// Short preview stored on the conversation row and pushed in
/// notification events.
pub fn summarize(body: &str, kind: &MessageKind) -> String {
    match kind {
        MessageKind::Image => "[image]".to_string(),
        MessageKind::Document => "[document]".to_string(),
        MessageKind::Text => {
            let mut summary: String = body.chars().take(120).collect();
            if body.chars().count() > 120 {
                summary.push('…');
            }
            summary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, mime: &str, size: i64) -> AttachmentMeta {
        AttachmentMeta {
            url: "https://store.example.com/f/abc".to_string(),
            name: name.to_string(),
            size,
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn accepts_images_and_documents() {
        assert!(meta("scan.png", "image/png", 1024).check(10 * 1024 * 1024).is_ok());
        assert!(meta("report.pdf", "application/pdf", 1024).check(10 * 1024 * 1024).is_ok());
        assert!(meta("notes.txt", "text/plain", 10).check(10 * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_oversized_attachment() {
        let err = meta("scan.png", "image/png", 11 * 1024 * 1024)
            .check(10 * 1024 * 1024)
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn rejects_disallowed_mime() {
        assert!(meta("setup.exe", "application/x-msdownload", 100).check(1024).is_err());
        assert!(meta("video.mp4", "video/mp4", 100).check(1024).is_err());
    }

    #[test]
    fn rejects_mime_extension_mismatch() {
        // Declared as a PDF but the name says executable.
        assert!(meta("setup.exe", "application/pdf", 100).check(1024).is_err());
    }

    #[test]
    fn kind_follows_mime_category() {
        assert_eq!(meta("a.png", "image/png", 1).kind(), MessageKind::Image);
        assert_eq!(meta("a.pdf", "application/pdf", 1).kind(), MessageKind::Document);
    }

    #[test]
    fn summary_truncates_long_text() {
        let body = "x".repeat(300);
        let summary = summarize(&body, &MessageKind::Text);
        assert_eq!(summary.chars().count(), 121);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn body_check_rejects_empty_and_oversized() {
        assert!(check_body("").is_err());
        assert!(check_body(&"x".repeat(MAX_BODY_CHARS + 1)).is_err());
    }

    #[test]
    fn body_check_accepts_bounds() {
        assert!(check_body("Hello").is_ok());
        assert!(check_body(&"x".repeat(MAX_BODY_CHARS)).is_ok());
        // Multibyte text is counted in characters, not bytes.
        assert!(check_body(&"đ".repeat(MAX_BODY_CHARS)).is_ok());
    }

    #[test]
    fn summary_labels_attachments() {
        assert_eq!(summarize("ignored", &MessageKind::Image), "[image]");
        assert_eq!(summarize("ignored", &MessageKind::Document), "[document]");
    }
}
