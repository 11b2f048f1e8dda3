use gemma_core::error::AssistantError;
use gemma_core::topic::{ChatMessage, ChatTopic, TopicRepository};
use gemma_infrastructure::JsonTopicRepository;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_two_stores_on_same_file_see_each_others_writes() {
    let temp_dir = TempDir::new().unwrap();
    let writer = JsonTopicRepository::in_dir(temp_dir.path());
    let reader = JsonTopicRepository::in_dir(temp_dir.path());

    let mut topic = ChatTopic::new("1712000000000", "Rust");
    topic.append(ChatMessage::user("What is a lifetime?"));
    topic.append(ChatMessage::assistant("A region of code where a reference is valid."));
    writer.save(&[topic.clone()]);

    let loaded = reader.load();
    assert_eq!(loaded.len(), 1, "Should load 1 topic");
    assert_eq!(loaded[0], topic);
}

#[test]
fn test_reset_topic_persists_empty_transcript() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonTopicRepository::in_dir(temp_dir.path());

    let mut topic = ChatTopic::new("1", "Scratch");
    topic.append(ChatMessage::user("hi"));
    repo.save(&[topic.clone()]);

    topic.reset();
    repo.save(&[topic]);

    let loaded = repo.load();
    assert_eq!(loaded[0].name, "Scratch");
    assert!(loaded[0].messages.is_empty(), "Transcript should be cleared");
}

#[test]
fn test_error_messages_survive_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonTopicRepository::in_dir(temp_dir.path());

    let mut topic = ChatTopic::new("1", "Offline");
    topic.append(ChatMessage::user("hello?"));
    topic.append(ChatMessage::error("Error: connection refused"));
    repo.save(&[topic]);

    let loaded = repo.load();
    let reply = &loaded[0].messages[1];
    assert!(reply.is_error);
    assert!(!reply.is_user);
}

#[test]
fn test_legacy_array_document_is_upgraded_on_next_save() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonTopicRepository::in_dir(temp_dir.path());
    fs::write(
        repo.path(),
        r#"[{"id":"1","name":"Welcome","messages":[{"text":"hi","isUser":true,"time":"10:00"}],"createdAt":"2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    let topics = repo.load();
    assert_eq!(topics.len(), 1);
    assert!(!topics[0].messages[0].is_error, "Missing isError defaults to false");

    repo.save(&topics);
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(repo.path()).unwrap()).unwrap();
    assert_eq!(raw["version"], "2.0.0");
}

#[test]
fn test_document_from_future_major_version_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonTopicRepository::in_dir(temp_dir.path());
    let document = r#"{"version":"9.0.0","topics":[]}"#;
    fs::write(repo.path(), document).unwrap();

    let err = repo.try_load().unwrap_err();
    assert!(matches!(err, AssistantError::Migration(_)), "Unexpected error: {}", err);
    assert!(repo.load().is_empty());
    assert_eq!(fs::read_to_string(repo.path()).unwrap(), document);
}
