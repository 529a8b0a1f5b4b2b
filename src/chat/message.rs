// src/chat/message.rs
//
// Rich text decoding: a "message" node is an ordered list of runs, each
// carrying either plain text or an emoji reference.

use serde_json::Value;

use crate::json::{get_bool, get_list, get_str, list_at};
use crate::chat::types::{Emoji, MessageSegment};

/// Decodes a message node into plain text plus ordered typed segments.
///
/// Text runs append verbatim. Emoji runs always become a segment; when the
/// emoji has at least one shortcut, the first shortcut is appended to the
/// plain text padded with one space on each side. The plain text is `None`
/// when no run contributed anything.
pub fn decode_message(node: Option<&Value>) -> (Option<String>, Vec<MessageSegment>) {
    let mut text = String::new();
    let mut segments = Vec::new();
    let runs = match node.and_then(|n| get_list(n, "runs")) {
        Some(runs) => runs,
        None => return (None, segments),
    };
    for run in runs {
        if let Some(t) = get_str(run, "text") {
            text.push_str(t);
            segments.push(MessageSegment::Text(t.to_string()));
        }
        if let Some(emoji_node) = run.get("emoji") {
            let emoji = decode_emoji(emoji_node);
            if let Some(first) = emoji.shortcuts.first() {
                text.push(' ');
                text.push_str(first);
                text.push(' ');
            }
            segments.push(MessageSegment::Emoji(emoji));
        }
    }
    let plain = if text.is_empty() { None } else { Some(text) };
    (plain, segments)
}

pub fn decode_emoji(node: &Value) -> Emoji {
    let mut emoji = Emoji {
        emoji_id: get_str(node, "emojiId").map(str::to_string),
        is_custom_emoji: get_bool(node, "isCustomEmoji"),
        ..Emoji::default()
    };
    if let Some(shortcuts) = get_list(node, "shortcuts") {
        emoji.shortcuts = shortcuts
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    if let Some(terms) = get_list(node, "searchTerms") {
        emoji.search_terms = terms
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    if let Some(thumbnails) = list_at(node, &["image"], "thumbnails") {
        emoji.icon_url = pick_thumbnail_url(thumbnails);
    }
    emoji
}

/// Largest-width-wins thumbnail selection. Replacement happens on
/// greater-or-equal width, so among equal-width candidates the last one wins.
pub fn pick_thumbnail_url(thumbnails: &[Value]) -> Option<String> {
    let mut best_width: i64 = 0;
    let mut url = None;
    for thumbnail in thumbnails {
        let width = crate::json::get_i64(thumbnail, "width").unwrap_or(0);
        if let Some(u) = get_str(thumbnail, "url") {
            if best_width <= width {
                best_width = width;
                url = Some(u.to_string());
            }
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_and_emoji_runs_in_order() {
        let message = json!({
            "runs": [
                {"text": "Hello "},
                {"emoji": {"emojiId": "e1", "shortcuts": [":)"]}},
                {"text": "!"},
            ]
        });
        let (plain, segments) = decode_message(Some(&message));
        assert_eq!(plain.as_deref(), Some("Hello  :)  !"));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], MessageSegment::Text("Hello ".into()));
        match &segments[1] {
            MessageSegment::Emoji(e) => assert_eq!(e.shortcuts, vec![":)"]),
            other => panic!("expected emoji segment, got {other:?}"),
        }
        assert_eq!(segments[2], MessageSegment::Text("!".into()));
    }

    #[test]
    fn emoji_without_shortcuts_is_segment_only() {
        let message = json!({
            "runs": [
                {"emoji": {"emojiId": "bare"}},
            ]
        });
        let (plain, segments) = decode_message(Some(&message));
        assert_eq!(plain, None);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn missing_runs_yields_nothing() {
        let (plain, segments) = decode_message(Some(&json!({})));
        assert_eq!(plain, None);
        assert!(segments.is_empty());
        let (plain, segments) = decode_message(None);
        assert_eq!(plain, None);
        assert!(segments.is_empty());
    }

    #[test]
    fn emoji_fields_copied_in_order() {
        let node = json!({
            "emojiId": "UC/abc",
            "shortcuts": [":cat:", ":kitty:"],
            "searchTerms": ["cat", "kitty"],
            "isCustomEmoji": true,
            "image": {"thumbnails": [
                {"url": "small", "width": 24},
                {"url": "big", "width": 48},
            ]}
        });
        let emoji = decode_emoji(&node);
        assert_eq!(emoji.emoji_id.as_deref(), Some("UC/abc"));
        assert_eq!(emoji.shortcuts, vec![":cat:", ":kitty:"]);
        assert_eq!(emoji.search_terms, vec!["cat", "kitty"]);
        assert_eq!(emoji.icon_url.as_deref(), Some("big"));
        assert!(emoji.is_custom_emoji);
    }

    #[test]
    fn last_entry_at_max_width_wins() {
        let thumbnails = vec![
            json!({"width": 100, "url": "A"}),
            json!({"width": 200, "url": "B"}),
            json!({"width": 200, "url": "C"}),
        ];
        assert_eq!(pick_thumbnail_url(&thumbnails).as_deref(), Some("C"));
    }

    #[test]
    fn entries_without_url_are_skipped() {
        let thumbnails = vec![
            json!({"width": 500}),
            json!({"width": 100, "url": "only"}),
        ];
        assert_eq!(pick_thumbnail_url(&thumbnails).as_deref(), Some("only"));
    }
}
