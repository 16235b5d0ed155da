//! `drivertree-cli` library surface: output rendering shared by the `dtree`
//! binary and its tests.

pub mod render;
