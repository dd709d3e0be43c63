/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Key presses routed to live sessions.
pub mod input_service;
/// Word matching rounds.
pub mod matching_service;
/// Verse drill sessions.
pub mod quiz_service;
/// Delayed event delivery.
pub mod timers;
/// Trivia boards and saved games.
pub mod trivia_service;
/// Random verse picker.
pub mod verse_service;
