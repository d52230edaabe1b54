//! Integration tests for the login flow
//!
//! These tests drive full hold, re-authentication and restore cycles against
//! the SQLite store.

mod recovery_tests;
mod support;
