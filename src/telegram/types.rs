use serde::{Deserialize, Serialize};

// --- Requests ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub url: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Lay `buttons` out `per_row` to a row; the last row may be shorter.
    pub fn from_buttons(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let inline_keyboard = buttons
            .chunks(per_row)
            .map(|row| row.to_vec())
            .collect();
        Self { inline_keyboard }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.inline_keyboard.iter().flatten()
    }
}

#[derive(Debug, Serialize)]
pub struct SendPhotoRequest<'a> {
    pub chat_id: &'a str,
    pub photo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
    pub reply_markup: &'a InlineKeyboard,
}

// --- Responses ---

#[derive(Debug, Deserialize)]
pub struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn test_keyboard_two_per_row() {
        let buttons = (1..=5)
            .map(|i| InlineButton::new(format!("b{}", i), format!("https://x/{}", i)))
            .collect();
        let kb = InlineKeyboard::from_buttons(buttons, 2);
        let widths: Vec<_> = kb.inline_keyboard.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![2, 2, 1]);
        assert_eq!(kb.buttons().count(), 5);
    }

    #[test]
    fn test_send_photo_payload_without_caption() {
        let kb = InlineKeyboard::from_buttons(vec![InlineButton::new("Download", "https://dl")], 2);
        let req = SendPhotoRequest {
            chat_id: "-100",
            photo: "https://banner",
            caption: None,
            parse_mode: None,
            reply_markup: &kb,
        };
        assert_eq!(
            to_value(&req).unwrap(),
            json!({
                "chat_id": "-100",
                "photo": "https://banner",
                "reply_markup": {
                    "inline_keyboard": [[{"text": "Download", "url": "https://dl"}]]
                }
            })
        );
    }

    #[test]
    fn test_deserialize_error_response() {
        let resp: TgResponse<TgMessage> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: wrong file identifier"}"#,
        )
        .unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.description.as_deref(), Some("Bad Request: wrong file identifier"));
    }
}
