//! Conversation storage
//!
//! Persists each conversation as one JSON file named after its id. Functions
//! take the directory explicitly so callers (and tests) control the location;
//! [`conversations_dir`] gives the default under the application data dir.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::storage::{get_data_dir, StorageError};
use crate::types::message::Conversation;

/// Default directory for conversation files, created if needed
pub fn conversations_dir() -> Result<PathBuf, StorageError> {
    let dir = get_data_dir()?.join("conversations");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn conversation_path(dir: &Path, id: Uuid) -> PathBuf {
    dir.join(format!("{id}.json"))
}

/// Save a conversation, overwriting any previous version
pub fn save_conversation(dir: &Path, conversation: &Conversation) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(conversation)?;
    fs::write(conversation_path(dir, conversation.id), json)?;
    tracing::debug!(id = %conversation.id, "Saved conversation");
    Ok(())
}

/// Load a conversation by id
pub fn load_conversation(dir: &Path, id: Uuid) -> Result<Conversation, StorageError> {
    let json = fs::read_to_string(conversation_path(dir, id))?;
    Ok(serde_json::from_str(&json)?)
}

/// List all stored conversations, most recently updated first.
///
/// Unreadable or corrupted files are skipped with a warning.
pub fn list_conversations(dir: &Path) -> Result<Vec<Conversation>, StorageError> {
    let mut conversations = Vec::new();

    if !dir.exists() {
        return Ok(conversations);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        match fs::read_to_string(&path).map_err(StorageError::from).and_then(|json| {
            serde_json::from_str::<Conversation>(&json).map_err(StorageError::from)
        }) {
            Ok(conv) => conversations.push(conv),
            Err(e) => tracing::warn!("Skipping unreadable conversation {:?}: {}", path, e),
        }
    }

    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(conversations)
}

/// Delete a stored conversation
pub fn delete_conversation(dir: &Path, id: Uuid) -> Result<(), StorageError> {
    fs::remove_file(conversation_path(dir, id))?;
    tracing::debug!(%id, "Deleted conversation");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::message::{Message, Role};

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut conv = Conversation::new("greetings");
        conv.push(Message::new(Role::User, "hi"));
        conv.push(Message::new(Role::Assistant, "hello"));

        save_conversation(dir.path(), &conv).unwrap();
        let loaded = load_conversation(dir.path(), conv.id).unwrap();

        assert_eq!(loaded.id, conv.id);
        assert_eq!(loaded.title, "greetings");
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[1].content, "hello");
    }

    #[test]
    fn test_list_sorted_by_recency() {
        let dir = tempfile::tempdir().unwrap();
        let older = Conversation::new("older");
        save_conversation(dir.path(), &older).unwrap();

        let mut newer = Conversation::new("newer");
        newer.push(Message::new(Role::User, "later"));
        save_conversation(dir.path(), &newer).unwrap();

        let all = list_conversations(dir.path()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "newer");
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_conversations(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_corrupted_files() {
        let dir = tempfile::tempdir().unwrap();
        let conv = Conversation::new("good");
        save_conversation(dir.path(), &conv).unwrap();
        fs::write(dir.path().join("bad.json"), "not json").unwrap();

        let all = list_conversations(dir.path()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "good");
    }

    #[test]
    fn test_delete_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let conv = Conversation::new("doomed");
        save_conversation(dir.path(), &conv).unwrap();
        delete_conversation(dir.path(), conv.id).unwrap();
        assert!(load_conversation(dir.path(), conv.id).is_err());
    }
}
