//! Scene-level tests driving the facade through its public API
