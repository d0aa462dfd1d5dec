//! Request and response bodies

pub mod audio;
