use teloxide::types::{Message, MessageKind};

use relaybot_core::{
    domain::{ChatId, MessageId, MessageRef, ThreadId},
    messaging::types::IncomingMessage,
};

/// Text messages with a known sender. Service messages, media without text
/// and channel posts (no `from`) yield `None`.
pub(crate) fn incoming_message(msg: &Message) -> Option<IncomingMessage> {
    let author = msg.from()?;
    let text = msg.text()?;
    let origin = ChatId(msg.chat.id.0);

    // Reply chains in plain supergroups carry a thread id too; only forum
    // topics count as a parent grouping.
    let is_topic_message = matches!(
        &msg.kind,
        MessageKind::Common(common) if common.is_topic_message
    );
    let parent = if is_topic_message {
        msg.thread_id.map(ThreadId)
    } else {
        None
    };

    Some(IncomingMessage {
        message: MessageRef {
            chat_id: origin,
            message_id: MessageId(msg.id.0),
        },
        author_is_bot: author.is_bot,
        origin,
        parent,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn parse(v: Value) -> Message {
        serde_json::from_value(v).unwrap()
    }

    fn forum_chat() -> Value {
        json!({ "id": -1001, "title": "Team", "type": "supergroup", "is_forum": true })
    }

    fn user(is_bot: bool) -> Value {
        json!({ "id": 42, "is_bot": is_bot, "first_name": "Sam" })
    }

    #[test]
    fn forum_topic_text_maps_every_field() {
        let msg = parse(json!({
            "message_id": 10,
            "message_thread_id": 7,
            "is_topic_message": true,
            "date": 1700000000,
            "chat": forum_chat(),
            "from": user(false),
            "text": "  hello  "
        }));

        let incoming = incoming_message(&msg).unwrap();
        assert_eq!(
            incoming.message,
            MessageRef {
                chat_id: ChatId(-1001),
                message_id: MessageId(10),
            }
        );
        assert_eq!(incoming.origin, ChatId(-1001));
        assert_eq!(incoming.parent, Some(ThreadId(7)));
        assert!(!incoming.author_is_bot);
        assert_eq!(incoming.text, "  hello  ");
    }

    #[test]
    fn reply_thread_outside_a_topic_has_no_parent() {
        let msg = parse(json!({
            "message_id": 11,
            "message_thread_id": 7,
            "date": 1700000000,
            "chat": { "id": -1002, "title": "Plain", "type": "supergroup", "is_forum": false },
            "from": user(false),
            "text": "hello"
        }));

        let incoming = incoming_message(&msg).unwrap();
        assert_eq!(incoming.origin, ChatId(-1002));
        assert_eq!(incoming.parent, None);
    }

    #[test]
    fn bot_sender_is_flagged() {
        let msg = parse(json!({
            "message_id": 12,
            "message_thread_id": 7,
            "is_topic_message": true,
            "date": 1700000000,
            "chat": forum_chat(),
            "from": user(true),
            "text": "beep"
        }));

        assert!(incoming_message(&msg).unwrap().author_is_bot);
    }

    #[test]
    fn message_without_sender_is_skipped() {
        let msg = parse(json!({
            "message_id": 13,
            "date": 1700000000,
            "chat": forum_chat(),
            "text": "anonymous"
        }));

        assert!(incoming_message(&msg).is_none());
    }

    #[test]
    fn photo_without_text_is_skipped() {
        let msg = parse(json!({
            "message_id": 14,
            "date": 1700000000,
            "chat": forum_chat(),
            "from": user(false),
            "photo": [{
                "file_id": "AgAD",
                "file_unique_id": "AQAD",
                "file_size": 1024,
                "width": 90,
                "height": 90
            }],
            "caption": "look"
        }));

        assert!(incoming_message(&msg).is_none());
    }
}
