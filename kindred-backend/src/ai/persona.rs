//! System-prompt assembly for persona replies

use super::{ChatMessage, MessageRole};
use crate::models::{MessageSender, Role, Thread};

/// Separator between memory snippets inside the prompt
const KNOWLEDGE_SEPARATOR: &str = "\n\n---\n\n";

/// Build the system prompt grounding a persona reply: identity and
/// background first, then the role's memory snippets, then the
/// behavioral instructions.
pub fn build_system_prompt(role: &Role, knowledge: &[String]) -> String {
    let background = if role.background.is_empty() {
        "none recorded"
    } else {
        role.background.as_str()
    };

    let memories = if knowledge.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nRelevant memories and stories:\n{}",
            knowledge.join(KNOWLEDGE_SEPARATOR)
        )
    };

    format!(
        "You are {name}, {description}.\n\n\
         Background: {background}{memories}\n\n\
         Reply in the speech habits of this person and keep their personality. \
         Be natural and warm, like a real person talking, and keep replies \
         short: the important part in two or three sentences.\n\n\
         If the user asks about memories or stories, draw on the memories \
         above, told in the first person as your own experience.",
        name = role.name,
        description = role.description,
        background = background,
        memories = memories,
    )
}

/// Map the stored thread history onto completion turns. User messages
/// become "user" turns, everything else "assistant".
pub fn history_to_turns(thread: &Thread) -> Vec<ChatMessage> {
    thread
        .content
        .iter()
        .map(|msg| ChatMessage {
            role: match msg.sender {
                MessageSender::User => MessageRole::User,
                MessageSender::Ai => MessageRole::Assistant,
            },
            content: msg.content.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Message, MessageKind};

    fn make_role(background: &str) -> Role {
        Role {
            id: "r1".to_string(),
            belongs_to: "alice".to_string(),
            name: "Grandpa Joe".to_string(),
            description: "a retired carpenter".to_string(),
            avatar: String::new(),
            background: background.to_string(),
            voice_id: "default".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_contains_identity_background_and_memories() {
        let role = make_role("Grew up on a farm in Ohio");
        let knowledge = vec![
            "Built the family table in 1974".to_string(),
            "Always whistled while working".to_string(),
        ];

        let prompt = build_system_prompt(&role, &knowledge);
        assert!(prompt.contains("You are Grandpa Joe, a retired carpenter."));
        assert!(prompt.contains("Background: Grew up on a farm in Ohio"));
        assert!(prompt.contains("Built the family table in 1974"));
        assert!(prompt.contains("Always whistled while working"));
        assert!(prompt.contains("\n\n---\n\n"));
    }

    #[test]
    fn empty_background_and_knowledge_use_placeholders() {
        let role = make_role("");
        let prompt = build_system_prompt(&role, &[]);
        assert!(prompt.contains("Background: none recorded"));
        assert!(!prompt.contains("Relevant memories and stories"));
    }

    #[test]
    fn history_maps_senders_to_turn_roles() {
        let thread = Thread {
            id: "t1".to_string(),
            user_id: "alice".to_string(),
            role_id: "r1".to_string(),
            title: "New conversation".to_string(),
            content: vec![
                Message {
                    id: "m1".to_string(),
                    sender: MessageSender::User,
                    sender_id: "alice".to_string(),
                    kind: MessageKind::Text,
                    content: "hi grandpa".to_string(),
                },
                Message {
                    id: "m2".to_string(),
                    sender: MessageSender::Ai,
                    sender_id: "r1".to_string(),
                    kind: MessageKind::Text,
                    content: "hello dear".to_string(),
                },
            ],
        };

        let turns = history_to_turns(&thread);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, "hi grandpa");
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, "hello dear");
    }
}
