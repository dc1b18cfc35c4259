//! Unit tests for the session lifecycle.
