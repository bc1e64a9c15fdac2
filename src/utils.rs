//! Utility functions shared by the tracking and control modules.

pub mod safe_cast;
