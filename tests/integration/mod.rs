//! Integration tests for configuration declaration and resolution

mod file_overrides;
