//! Unit tests for backend access.
