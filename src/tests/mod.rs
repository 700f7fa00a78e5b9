//! Cross-module behaviour tests
