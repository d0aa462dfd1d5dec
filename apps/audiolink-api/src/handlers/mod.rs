//! HTTP handlers

pub mod audio;
