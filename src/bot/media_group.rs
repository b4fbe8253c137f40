use dashmap::DashMap;

use crate::telegram::Message;

/// Collects album messages until their flush timer fires
#[derive(Default)]
pub struct MediaGroupBuffer {
    groups: DashMap<String, Vec<Message>>,
}

impl MediaGroupBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a message; true when it opened a new group and a flush must be scheduled
    pub fn push(&self, group_id: &str, message: Message) -> bool {
        let mut entry = self.groups.entry(group_id.to_string()).or_default();
        entry.push(message);
        entry.len() == 1
    }

    /// Remove and return everything buffered for the group, in arrival order
    pub fn take(&self, group_id: &str) -> Vec<Message> {
        self.groups
            .remove(group_id)
            .map(|(_, messages)| messages)
            .unwrap_or_default()
    }

    pub fn pending(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i64) -> Message {
        Message {
            message_id: id,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_push_schedules_flush() {
        let buffer = MediaGroupBuffer::new();
        assert!(buffer.push("g", msg(1)));
        assert!(!buffer.push("g", msg(2)));
        assert!(buffer.push("h", msg(3)));
        assert_eq!(buffer.pending(), 2);
    }

    #[test]
    fn test_take_drains_group() {
        let buffer = MediaGroupBuffer::new();
        buffer.push("g", msg(1));
        buffer.push("g", msg(2));

        let ids: Vec<_> = buffer.take("g").iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(buffer.take("g").is_empty());
        // A late message after the flush starts a fresh group
        assert!(buffer.push("g", msg(3)));
    }
}
