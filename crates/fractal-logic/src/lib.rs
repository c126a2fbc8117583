//! Pure game logic for Fractal Quest.
//!
//! This crate holds everything about the chapter progression that does not
//! touch storage or a UI: the chapter table, the puzzle gates guarding each
//! chapter, and the rules that turn a completed gate into XP, levels and
//! milestone flags. Functions take plain data and return results, so the
//! whole game can be driven headless.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Ordered 27-chapter table, golden path, book bosses |
//! | [`gates`] | Gate trait and the mirror, call/response, network, convergence and practice variants |
//! | [`rules`] | XP reward, level curve, milestone chapters, terminal clamp |
//! | [`save`] | SaveGame model, persisted record layout, completion transition |
//! | [`selector`] | Archetype → gate constructor |

pub mod catalog;
pub mod gates;
pub mod rules;
pub mod save;
pub mod selector;
