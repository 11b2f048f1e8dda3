//! Infrastructure layer: filesystem paths, configuration loading and the
//! JSON topic store.

pub mod config_service;
pub mod dto;
pub mod json_topic_repository;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use json_topic_repository::JsonTopicRepository;
pub use paths::{GemmaPaths, PathError};
