//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use app_lib::{config::Config, web::AppRuntime};
use std::sync::Arc;
use wellness_core::testing::{remote_session, InMemoryPreferences, StubSessionSource};
use wellness_core::RemoteSession;

pub fn test_config() -> Arc<Config> {
    let config = Config::from_lookup(|key: &str| match key {
        "WELLNESS_API_URL" => Some("http://127.0.0.1:9/api".to_string()),
        _ => None,
    })
    .expect("test config is valid");
    Arc::new(config)
}

/// The catalogue most tests run against.
pub fn catalogue() -> Vec<RemoteSession> {
    vec![
        remote_session(1, "Morning Yoga Flow", "Yoga"),
        remote_session(2, "Guided Breathing", "Meditation"),
        remote_session(3, "Deep Tissue Basics", "Massage"),
        remote_session(4, "Evening Yoga Stretch", "yoga"),
        remote_session(5, "Salsa for Beginners", "Dance"),
    ]
}

pub struct Harness {
    pub runtime: AppRuntime,
    pub source: Arc<StubSessionSource>,
    pub prefs: Arc<InMemoryPreferences>,
}

/// Starts an app over in-memory ports.
pub fn start(sessions: Vec<RemoteSession>) -> Harness {
    let source = Arc::new(StubSessionSource::new(sessions));
    let prefs = Arc::new(InMemoryPreferences::new());
    let runtime = AppRuntime::start(test_config(), source.clone(), prefs.clone());
    Harness {
        runtime,
        source,
        prefs,
    }
}
