// src/utils/mod.rs

pub mod clock;
pub mod html;
pub mod jwt;
pub mod video;
