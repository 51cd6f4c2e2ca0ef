//! Route modules for Vignette Server

pub mod sheets;
