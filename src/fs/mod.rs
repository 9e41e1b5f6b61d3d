//! # File System Module
//!
//! This is a container for file system modules.  A file system module owns
//! its volume image as a byte buffer and handles interactions with
//! directories and files.  N.b. this means you have to explicitly save the
//! underlying image if you want changes to be permanent.

pub mod mfs;
