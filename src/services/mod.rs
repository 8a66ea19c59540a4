/// Community and membership management.
pub mod community_service;
/// Competition lifecycle, enrollment and game scheduling.
pub mod competition_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Player registry.
pub mod player_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Game results and per-competition standings.
pub mod stats_service;
/// Storage connection supervision with retry and backoff.
pub mod storage_supervisor;
