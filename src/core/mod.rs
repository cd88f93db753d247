// src/core/mod.rs

pub mod hangul;
pub mod sanitize;
