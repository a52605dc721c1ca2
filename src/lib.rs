//! TETRS engine - the rules of a falling-block puzzle game
//!
//! The engine is a pure state machine: [`reduce`] maps the current
//! [`GameState`] and an [`Action`] to the next state plus a one-shot
//! [`RenderPatch`]. Hosts fold their event stream through a [`Game`] and
//! hand each resulting [`Snapshot`] to whatever draws the board.

pub mod board;
pub mod game;
pub mod input;
pub mod kick;
pub mod piece;
pub mod score;
pub mod selector;
pub mod settings;
pub mod snapshot;
pub mod tetromino;
mod tick;

pub use board::Matrix;
pub use game::{Action, Game, GameState, RenderPatch, Transition, reduce};
pub use input::{InputFilter, Key, Ticker};
pub use piece::{Block, Position, Shape};
pub use score::Score;
pub use selector::{hash, new_shape};
pub use settings::{Settings, SettingsError};
pub use snapshot::{BlockView, Snapshot};
pub use tetromino::{Rotation, Style, TetrominoType};
