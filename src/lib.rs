//! Simulation core for Safe Voyage, a deck-patrol arcade game.
//!
//! The player walks a ship deck and talks passengers out of unsafe behavior
//! before their hazard escalates into an accident. Everything here is plain
//! data plus deterministic update functions; all randomness comes through an
//! injected `rand::Rng`, and persistence goes through [`storage::ProgressStore`].
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`geometry`] | Vectors, rectangles, circle tests |
//! | [`entities`] | Player, NPC and game-state data |
//! | [`catalog`] | Behavior, level, upgrade and obstacle tables |
//! | [`movement`] | Target seeking with obstacle sliding and deck drift |
//! | [`compute`] | The game state machine |
//! | [`storage`] | Save records and key-value stores |
//! | [`error`] | Storage errors |

pub mod catalog;
pub mod compute;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod movement;
pub mod storage;
