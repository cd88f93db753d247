// src/gui/components/mod.rs
pub mod controls;
pub mod roster_table;
