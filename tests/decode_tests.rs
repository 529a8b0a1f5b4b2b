// tests/decode_tests.rs

use serde_json::json;
use tubechat::chat::decode::{decode_actions, decode_item, DecodedActions};
use tubechat::{AuthorRole, ChatEventKind, MessageSegment};

fn decode(actions: Vec<serde_json::Value>) -> DecodedActions {
    let mut out = DecodedActions::default();
    decode_actions(&actions, &mut out);
    out
}

#[test]
fn unknown_action_keys_are_ignored() {
    let out = decode(vec![
        json!({"someFutureAction": {"item": {}}}),
        json!({}),
    ]);
    assert!(out.events.is_empty());
    assert!(out.deletions.is_empty());
    assert!(out.banner.is_none());
}

#[test]
fn item_without_id_is_dropped() {
    let out = decode(vec![json!({
        "addChatItemAction": {"item": {
            "liveChatTextMessageRenderer": {
                "authorName": {"simpleText": "someone"},
                "message": {"runs": [{"text": "hi"}]},
            }
        }}
    })]);
    assert!(out.events.is_empty());
}

#[test]
fn text_message_decodes_common_fields() {
    let out = decode(vec![json!({
        "addChatItemAction": {"item": {
            "liveChatTextMessageRenderer": {
                "id": "msg-1",
                "authorName": {"simpleText": "viewer"},
                "authorExternalChannelId": "UCchan",
                "timestampUsec": "1622537200000000",
                "message": {"runs": [{"text": "hello"}]},
                "authorPhoto": {"thumbnails": [
                    {"url": "icon32", "width": 32},
                    {"url": "icon64", "width": 64},
                ]},
                "authorBadges": [
                    {"liveChatAuthorBadgeRenderer": {"icon": {"iconType": "MODERATOR"}}},
                    {"liveChatAuthorBadgeRenderer": {"customThumbnail": {"thumbnails": [
                        {"url": "badge16", "width": 16},
                        {"url": "badge32", "width": 32},
                    ]}}},
                ],
                "contextMenuEndpoint": {"liveChatItemContextMenuEndpoint": {"params": "menu-params"}},
            }
        }}
    })]);
    assert_eq!(out.events.len(), 1);
    let event = &out.events[0];
    assert_eq!(event.kind, ChatEventKind::Message);
    assert_eq!(event.id.as_deref(), Some("msg-1"));
    assert_eq!(event.author_name.as_deref(), Some("viewer"));
    assert_eq!(event.author_channel_id.as_deref(), Some("UCchan"));
    assert_eq!(event.timestamp_usec, 1_622_537_200_000_000);
    assert_eq!(event.message.as_deref(), Some("hello"));
    assert_eq!(event.author_icon_url.as_deref(), Some("icon64"));
    assert_eq!(event.member_badge_icon_url.as_deref(), Some("badge32"));
    assert!(event.has_role(AuthorRole::Normal));
    assert!(event.is_author_moderator());
    assert!(event.is_author_member());
    assert!(!event.is_author_owner());
}

#[test]
fn paid_message_overlays_colors_and_amount() {
    let out = decode(vec![json!({
        "addChatItemAction": {"item": {
            "liveChatPaidMessageRenderer": {
                "id": "paid-1",
                "authorName": {"simpleText": "fan"},
                "message": {"runs": [{"text": "take my money"}]},
                "purchaseAmountText": {"simpleText": "$5.00"},
                "bodyBackgroundColor": 4280150454u32,
                "bodyTextColor": 4278190080u32,
                "headerBackgroundColor": 4278239141u32,
                "headerTextColor": 4294967295u32,
                "authorNameTextColor": 3003121664u32,
            }
        }}
    })]);
    let event = &out.events[0];
    assert_eq!(event.kind, ChatEventKind::PaidMessage);
    assert_eq!(event.purchase_amount.as_deref(), Some("$5.00"));
    assert_eq!(event.body_background_color, 4_280_150_454);
    assert_eq!(event.body_text_color, 4_278_190_080);
    assert_eq!(event.header_background_color, 4_278_239_141);
    assert_eq!(event.header_text_color, 4_294_967_295);
    assert_eq!(event.author_name_text_color, 3_003_121_664);
}

#[test]
fn paid_sticker_overlays_sticker_fields() {
    let out = decode(vec![json!({
        "addChatItemAction": {"item": {
            "liveChatPaidStickerRenderer": {
                "id": "sticker-1",
                "authorName": {"simpleText": "fan"},
                "purchaseAmountText": {"simpleText": "¥200"},
                "backgroundColor": 4278237396u32,
                "sticker": {"thumbnails": [
                    {"url": "s72", "width": 72},
                    {"url": "s144", "width": 144},
                ]},
            }
        }}
    })]);
    let event = &out.events[0];
    assert_eq!(event.kind, ChatEventKind::PaidSticker);
    assert_eq!(event.purchase_amount.as_deref(), Some("¥200"));
    assert_eq!(event.background_color, 4_278_237_396);
    assert_eq!(event.sticker_icon_url.as_deref(), Some("s144"));
}

#[test]
fn membership_item_uses_header_subtext() {
    let out = decode(vec![json!({
        "addChatItemAction": {"item": {
            "liveChatMembershipItemRenderer": {
                "id": "member-1",
                "authorName": {"simpleText": "new member"},
                "headerSubtext": {"runs": [{"text": "Welcome!"}]},
            }
        }}
    })]);
    let event = &out.events[0];
    assert_eq!(event.kind, ChatEventKind::NewMemberMessage);
    assert_eq!(event.message.as_deref(), Some("Welcome!"));
}

#[test]
fn ticker_decodes_inner_renderer_then_overlays() {
    let out = decode(vec![json!({
        "addChatItemAction": {"item": {
            "liveChatTickerPaidMessageItemRenderer": {
                "durationSec": 5,
                "fullDurationSec": 300,
                "endBackgroundColor": 4291821568u32,
                "showItemEndpoint": {"showLiveChatItemEndpoint": {"renderer": {
                    "liveChatPaidMessageRenderer": {
                        "id": "ticker-1",
                        "authorName": {"simpleText": "supporter"},
                        "message": {"runs": [{"text": "hi from ticker"}]},
                        "purchaseAmountText": {"simpleText": "$20.00"},
                    }
                }}},
            }
        }}
    })]);
    assert_eq!(out.events.len(), 1);
    let event = &out.events[0];
    assert_eq!(event.kind, ChatEventKind::TickerPaidMessage);
    assert_eq!(event.duration_sec, 5);
    assert_eq!(event.full_duration_sec, 300);
    assert_eq!(event.end_background_color, 4_291_821_568);
    // Inherited from the inner paid renderer.
    assert_eq!(event.id.as_deref(), Some("ticker-1"));
    assert_eq!(event.author_name.as_deref(), Some("supporter"));
    assert_eq!(event.message.as_deref(), Some("hi from ticker"));
    assert_eq!(event.purchase_amount.as_deref(), Some("$20.00"));
    // Ticker items also land in the dedicated ticker list.
    assert_eq!(out.ticker_events.len(), 1);
    assert_eq!(out.ticker_events[0].id.as_deref(), Some("ticker-1"));
}

#[test]
fn replay_wrapper_recurses_into_inner_actions() {
    let out = decode(vec![json!({
        "replayChatItemAction": {"actions": [{
            "addChatItemAction": {"item": {
                "liveChatTextMessageRenderer": {
                    "id": "replayed-1",
                    "message": {"runs": [{"text": "from the past"}]},
                }
            }}
        }]}
    })]);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].id.as_deref(), Some("replayed-1"));
}

#[test]
fn banner_pin_replaces_previous_banner() {
    let banner = |id: &str| {
        json!({
            "addBannerToLiveChatCommand": {"bannerRenderer": {"liveChatBannerRenderer": {
                "contents": {"liveChatTextMessageRenderer": {
                    "id": id,
                    "message": {"runs": [{"text": "pinned"}]},
                }}
            }}}
        })
    };
    let out = decode(vec![banner("pin-1"), banner("pin-2")]);
    assert_eq!(out.banner.as_ref().unwrap().id.as_deref(), Some("pin-2"));
    assert!(out.events.is_empty());
}

#[test]
fn mark_as_deleted_goes_to_deletion_list() {
    let out = decode(vec![json!({
        "markChatItemAsDeletedAction": {
            "targetItemId": "msg-9",
            "deletedStateMessage": {"runs": [{"text": "[message deleted]"}]},
        }
    })]);
    assert!(out.events.is_empty());
    assert_eq!(out.deletions.len(), 1);
    assert_eq!(out.deletions[0].target_id.as_deref(), Some("msg-9"));
    assert_eq!(out.deletions[0].message.as_deref(), Some("[message deleted]"));
}

#[test]
fn engagement_message_is_platform_authored() {
    let event = decode_item(&json!({
        "liveChatViewerEngagementMessageRenderer": {
            "id": "engage-1",
            "timestampUsec": "1622537200000001",
            "message": {"runs": [{"text": "Welcome to live chat!"}]},
        }
    }));
    assert_eq!(event.kind, ChatEventKind::ViewerEngagementMessage);
    assert_eq!(event.author_name.as_deref(), Some("YouTube"));
    assert_eq!(event.author_channel_id.as_deref(), Some("user/YouTube"));
    assert!(event.has_role(AuthorRole::Platform));
    assert_eq!(event.message.as_deref(), Some("Welcome to live chat!"));
}

#[test]
fn emoji_segments_preserve_order() {
    let event = decode_item(&json!({
        "liveChatTextMessageRenderer": {
            "id": "msg-e",
            "message": {"runs": [
                {"text": "Hello "},
                {"emoji": {"emojiId": "e", "shortcuts": [":)"]}},
                {"text": "!"},
            ]},
        }
    }));
    assert_eq!(event.message.as_deref(), Some("Hello  :)  !"));
    assert_eq!(event.segments.len(), 3);
    assert!(matches!(event.segments[1], MessageSegment::Emoji(_)));
}
