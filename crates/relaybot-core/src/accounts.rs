use crate::domain::ChatId;

/// Static mapping from logical account name to its origin chat.
///
/// Built once from configuration and read-only afterwards. Lookup order is the
/// configuration order, so the first account claiming a chat wins.
#[derive(Clone, Debug, Default)]
pub struct AccountRegistry {
    entries: Vec<(String, ChatId)>,
}

impl AccountRegistry {
    pub fn new(entries: impl IntoIterator<Item = (String, ChatId)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Account name for a message origin, if that origin is registered.
    pub fn account_for(&self, origin: ChatId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, id)| *id == origin)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_account_wins() {
        let reg = AccountRegistry::new([
            ("alpha".to_string(), ChatId(1)),
            ("beta".to_string(), ChatId(1)),
            ("gamma".to_string(), ChatId(2)),
        ]);
        assert_eq!(reg.account_for(ChatId(1)), Some("alpha"));
        assert_eq!(reg.account_for(ChatId(2)), Some("gamma"));
        assert_eq!(reg.account_for(ChatId(3)), None);
        assert_eq!(reg.len(), 3);
    }
}
