//! 类型系统模块：定义对话消息与会话的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed conversation primitives. Every value here is validated when it
//! is built, so the dispatcher never has to re-check roles or shapes.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//! | [`Conversation`] | Ordered, immutable list of messages |
//!
//! ## Example
//!
//! ```rust
//! use simple_infer::types::{Conversation, Message};
//!
//! let conv = Conversation::new(vec![
//!     Message::system("You are a helpful assistant."),
//!     Message::user("What is the capital of France?"),
//! ]);
//! assert_eq!(conv.len(), 2);
//!
//! // Untrusted input goes through the checked constructor.
//! assert!(Message::new("wizard", "hi").is_err());
//! ```

pub mod message;

pub use message::{Conversation, Message, MessageRole};
