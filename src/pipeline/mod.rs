//! Pipeline stages for highlight extraction.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested against an in-memory [`crate::document::Document`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ detect ──▶ (sort) ──▶ extract ──▶ assemble ──▶ render
//! (path)   (regions)             (spans)     (paragraphs) (md/html)
//! ```
//!
//! 1. [`input`]    — check the path names a readable PDF
//! 2. [`detect`]   — highlight annotations, or the color-mask fallback
//! 3. [`extract`]  — styled spans inside each region, classified into blocks
//! 4. [`assemble`] — group consecutive blocks with the same header signature
//! 5. [`render`]   — Markdown or HTML
//!
//! [`pdfium`] is the production document backend and [`layout`] its helper
//! for turning loose text objects into blocks and lines.

pub mod assemble;
pub mod detect;
pub mod extract;
pub mod input;
pub mod layout;
pub mod pdfium;
pub mod render;
