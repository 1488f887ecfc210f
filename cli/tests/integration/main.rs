//! Integration tests for deploy-verify
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! They are slower and should be run separately from unit tests.

#[cfg(unix)]
mod fake_terraform;
