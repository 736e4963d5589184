//! HTML Interpreter.
//!
//! Two independent extractors share the DOM traversal helpers in
//! `dom`: `mwb` recovers one `MWBWeek` per valid week document, and
//! `watchtower` recovers every `WStudy` from a TOC + article pair.

pub mod dom;
pub mod mwb;
pub mod watchtower;
