//! Core game state and the action reducer
//!
//! Every action maps the current [`GameState`] to a brand new one; nothing is
//! mutated in place. Alongside the new state each action yields a
//! [`RenderPatch`] listing what the render layer should drop this step.

use crate::board::Matrix;
use crate::kick::first_valid_kick;
use crate::piece::{Block, Shape};
use crate::score::Score;
use crate::selector::new_shape;
use crate::settings::Settings;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Actions the engine can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Translate the current shape
    Move { dx: i32, dy: i32 },
    /// Rotate the current shape a quarter turn clockwise
    Rotate,
    /// Timer step with a strictly increasing counter
    Tick { elapsed: u64 },
    /// Start over after the game ended
    Restart,
    /// Hold the current shape, or swap it with the held one
    Store,
}

impl Action {
    pub const LEFT: Action = Action::Move { dx: -1, dy: 0 };
    pub const RIGHT: Action = Action::Move { dx: 1, dy: 0 };
    pub const DOWN: Action = Action::Move { dx: 0, dy: 1 };
}

/// One-shot render diff produced by a single action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPatch {
    /// Blocks to purge from the play-field surface
    pub removed: Vec<Block>,
    /// Expired preview blocks
    pub changed_preview: Vec<Block>,
    /// Expired held blocks, if the hold slot changed
    pub changed_store: Option<Vec<Block>>,
}

impl RenderPatch {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.changed_preview.is_empty() && self.changed_store.is_none()
    }
}

/// The aggregate game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(crate) settings: Arc<Settings>,
    /// Held shape
    pub store: Option<Shape>,
    /// Next shape
    pub preview: Shape,
    /// Falling shape
    pub current: Shape,
    /// Settled blocks
    pub blocks: Vec<Block>,
    /// Occupancy of the settled blocks
    pub matrix: Matrix,
    pub game_end: bool,
    pub score: Score,
    /// Running id/seed counter
    pub blocks_count: u64,
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub patch: RenderPatch,
}

impl Transition {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.patch)
    }
}

impl GameState {
    /// Initial state for the given settings.
    ///
    /// Settings are expected to have passed [`Settings::validate`]; the
    /// engine tolerates out-of-range grid and level values without
    /// panicking, but the resulting game is not meaningful.
    pub fn new(settings: Arc<Settings>) -> Self {
        let spawn = &settings.spawn;
        let preview = new_shape(spawn.preview, spawn.initial_preview_seed, &settings);
        let current = new_shape(spawn.current, spawn.initial_current_seed, &settings);
        Self {
            store: None,
            preview,
            current,
            blocks: Vec::new(),
            matrix: Matrix::empty(&settings),
            game_end: false,
            score: Score::new(&settings.timing),
            blocks_count: spawn.initial_blocks_count,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Blocks currently on the play-field: the falling shape, then the
    /// settled blocks
    pub fn visible_blocks(&self) -> impl Iterator<Item = &Block> {
        self.current.blocks.iter().chain(&self.blocks)
    }

    /// Apply an action
    pub fn apply(&self, action: Action) -> Transition {
        match action {
            Action::Move { dx, dy } => self.move_by(dx, dy),
            Action::Rotate => self.rotate(),
            Action::Tick { elapsed } => self.tick(elapsed),
            Action::Restart => self.restart(),
            Action::Store => self.store(),
        }
    }

    pub(crate) fn unchanged(&self) -> Transition {
        Transition {
            state: self.clone(),
            patch: RenderPatch::default(),
        }
    }

    pub(crate) fn with_current(&self, current: Shape) -> Transition {
        Transition {
            state: GameState {
                current,
                ..self.clone()
            },
            patch: RenderPatch::default(),
        }
    }

    /// Whether the falling shape rests on the floor or a settled block
    pub fn is_landed(&self) -> bool {
        self.matrix.has_landed(self.current.positions())
    }

    fn move_by(&self, dx: i32, dy: i32) -> Transition {
        if self.game_end {
            return self.unchanged();
        }

        // Ground contact is judged before the move
        let grounded = self.is_landed();
        let moved = self.current.translated(dx, dy);
        let mut current = if self.matrix.is_valid(&moved.blocks) {
            moved
        } else {
            trace!(dx, dy, "move rejected");
            self.current.clone()
        };

        if grounded && dy > 0 {
            current.land_delay -= 1;
        }
        self.with_current(current)
    }

    fn rotate(&self) -> Transition {
        if self.game_end {
            return self.unchanged();
        }

        let rotation = self.current.rotation.cw();
        let rotated = self.current.layout(rotation);
        match first_valid_kick(&rotated, &self.matrix) {
            Some(blocks) => self.with_current(Shape {
                blocks,
                rotation,
                ..self.current.clone()
            }),
            None => {
                trace!(kind = ?self.current.kind, "rotation rejected");
                self.unchanged()
            }
        }
    }

    fn restart(&self) -> Transition {
        if !self.game_end {
            return self.unchanged();
        }

        let settings = &self.settings;
        let mut score = self.score.clone();
        score.restart(&settings.timing);
        info!(high_score = score.high_score, "game restarted");

        Transition {
            state: GameState {
                settings: Arc::clone(settings),
                store: None,
                preview: new_shape(settings.spawn.preview, self.blocks_count + 4, settings),
                current: new_shape(settings.spawn.current, self.blocks_count, settings),
                blocks: Vec::new(),
                matrix: Matrix::empty(settings),
                game_end: false,
                score,
                blocks_count: self.blocks_count + 8,
            },
            patch: RenderPatch {
                removed: Vec::new(),
                changed_preview: self.preview.blocks.to_vec(),
                changed_store: self.store.as_ref().map(|held| held.blocks.to_vec()),
            },
        }
    }

    fn store(&self) -> Transition {
        if self.game_end {
            return self.unchanged();
        }

        let spawn = &self.settings.spawn;
        let land_delay = self.settings.timing.land_delay;
        let held = self.current.recentered(spawn.store, false, land_delay);

        match &self.store {
            Some(_) if self.current.swapped => {
                trace!("hold already used by this shape");
                self.unchanged()
            }
            Some(previous) => Transition {
                state: GameState {
                    store: Some(held),
                    current: previous.recentered(spawn.current, true, land_delay),
                    ..self.clone()
                },
                patch: RenderPatch {
                    removed: self.current.blocks.to_vec(),
                    changed_preview: Vec::new(),
                    changed_store: Some(previous.blocks.to_vec()),
                },
            },
            None => Transition {
                state: GameState {
                    store: Some(held),
                    current: self.preview.recentered(spawn.current, true, land_delay),
                    preview: new_shape(spawn.preview, self.blocks_count, &self.settings),
                    blocks_count: self.blocks_count + 4,
                    ..self.clone()
                },
                patch: RenderPatch {
                    removed: self.current.blocks.to_vec(),
                    changed_preview: self.preview.blocks.to_vec(),
                    changed_store: None,
                },
            },
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Arc::new(Settings::default()))
    }
}

/// Apply `action` to `state`
pub fn reduce(state: &GameState, action: Action) -> Transition {
    state.apply(action)
}

/// The single state slot threaded through the event fold
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    actions: u64,
}

impl Game {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            state: GameState::new(settings),
            actions: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of actions folded so far
    pub fn actions(&self) -> u64 {
        self.actions
    }

    /// Fold one action into the slot and return the snapshot to render
    pub fn process_action(&mut self, action: Action) -> Snapshot {
        let transition = reduce(&self.state, action);
        if transition.state.game_end && !self.state.game_end {
            debug!(actions = self.actions, "fold reached game over");
        }
        let snapshot = transition.snapshot();
        self.state = transition.state;
        self.actions += 1;
        snapshot
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Arc::new(Settings::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Position;
    use crate::tetromino::{Rotation, TetrominoType};

    fn settled(x: i32, y: i32) -> Block {
        Block::new(
            format!("s{x}_{y}"),
            Position::new(x, y),
            crate::tetromino::Style::Red,
            (20.0, 20.0),
        )
    }

    /// State whose current shape is a straight piece at `center`
    fn with_straight(center: Position) -> GameState {
        let state = GameState::default();
        let current = Shape::spawn(TetrominoType::I, center, 100, 2, (20.0, 20.0));
        GameState { current, ..state }
    }

    fn with_blocks(state: GameState, blocks: Vec<Block>) -> GameState {
        let matrix = Matrix::rebuild(&blocks, state.settings());
        GameState {
            blocks,
            matrix,
            ..state
        }
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::default();
        assert_eq!(state.preview.kind, TetrominoType::T);
        assert_eq!(state.current.kind, TetrominoType::J);
        assert_eq!(state.blocks_count, 8);
        assert_eq!(state.score.speed, 150);
        assert!(state.store.is_none());
        assert!(state.matrix.is_empty());
        assert!(!state.game_end);
    }

    #[test]
    fn test_move_translates_center_and_blocks() {
        let state = GameState::default();
        let next = reduce(&state, Action::RIGHT).state;
        assert_eq!(next.current.center, state.current.center.offset(1, 0));
        for (before, after) in state.current.blocks.iter().zip(&next.current.blocks) {
            assert_eq!(after.position, before.position.offset(1, 0));
        }
    }

    #[test]
    fn test_move_left_at_wall_is_rejected() {
        let state = with_straight(Position::new(1, 5));
        assert_eq!(state.current.blocks[1].position.x, 0);
        let next = reduce(&state, Action::LEFT);
        assert_eq!(next.state, state);
        assert!(next.patch.is_empty());
    }

    #[test]
    fn test_move_into_settled_block_is_rejected() {
        let state = with_blocks(with_straight(Position::new(4, 5)), vec![settled(7, 5)]);
        let next = reduce(&state, Action::RIGHT).state;
        assert_eq!(next, state);
    }

    #[test]
    fn test_down_press_on_ground_shortens_land_delay() {
        let state = with_straight(Position::new(4, 19));
        assert!(state.is_landed());
        let next = reduce(&state, Action::DOWN).state;
        assert_eq!(next.current.land_delay, 1);
        assert_eq!(next.current.center, state.current.center);

        // Sideways moves leave the delay alone
        let sideways = reduce(&state, Action::RIGHT).state;
        assert_eq!(sideways.current.land_delay, 2);
    }

    #[test]
    fn test_down_press_in_air_keeps_land_delay() {
        let state = with_straight(Position::new(4, 5));
        let next = reduce(&state, Action::DOWN).state;
        assert_eq!(next.current.land_delay, 2);
        assert_eq!(next.current.center, Position::new(4, 6));
    }

    #[test]
    fn test_rotate_advances_state_and_keeps_center() {
        let state = with_straight(Position::new(4, 5));
        let next = reduce(&state, Action::Rotate).state;
        assert_eq!(next.current.rotation, Rotation::East);
        assert_eq!(next.current.center, state.current.center);
        let expected: Vec<_> = TetrominoType::I
            .offsets(Rotation::East)
            .iter()
            .map(|&(dx, dy)| Position::new(4 + dx, 5 + dy))
            .collect();
        assert_eq!(next.current.positions().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for kind in TetrominoType::all() {
            let state = GameState::default();
            let mut current = Shape::spawn(kind, Position::new(4, 8), 40, 2, (20.0, 20.0));
            current.blocks = current.layout(Rotation::North);
            let start = GameState { current, ..state };

            let mut state = start.clone();
            for _ in 0..4 {
                state = reduce(&state, Action::Rotate).state;
            }
            assert_eq!(state.current, start.current, "{kind:?}");
        }
    }

    #[test]
    fn test_rotate_kicks_off_right_wall() {
        // Vertical straight in the last column: rotating back to horizontal
        // would poke out past the wall
        let mut state = with_straight(Position::new(8, 5));
        state.current.rotation = Rotation::West;
        state.current.blocks = state.current.layout(Rotation::West);
        assert!(state.matrix.is_valid(&state.current.blocks));

        let next = reduce(&state, Action::Rotate).state;
        assert_eq!(next.current.rotation, Rotation::North);
        assert!(next.matrix.is_valid(&next.current.blocks));
        assert_eq!(next.current.center, state.current.center);
    }

    #[test]
    fn test_rotate_fully_blocked_is_rejected() {
        let state = with_straight(Position::new(4, 5));
        let walls: Vec<_> = (2..=7)
            .flat_map(|x| [settled(x, 4), settled(x, 6), settled(x, 7)])
            .collect();
        let state = with_blocks(state, walls);
        let next = reduce(&state, Action::Rotate).state;
        assert_eq!(next, state);
    }

    #[test]
    fn test_first_store_takes_preview() {
        let state = GameState::default();
        let next = reduce(&state, Action::Store);

        let held = next.state.store.as_ref().unwrap();
        assert_eq!(held.kind, TetrominoType::J);
        assert!(!held.swapped);
        assert_eq!(held.center, state.settings().spawn.store);

        assert_eq!(next.state.current.kind, TetrominoType::T);
        assert!(next.state.current.swapped);
        assert_eq!(next.state.current.center, state.settings().spawn.current);
        assert_eq!(next.state.blocks_count, 12);
        assert_eq!(next.state.preview.blocks[0].id, format!("{}8", next.state.preview.kind.id_prefix()));

        assert_eq!(next.patch.removed, state.current.blocks.to_vec());
        assert_eq!(next.patch.changed_preview, state.preview.blocks.to_vec());
        assert_eq!(next.patch.changed_store, None);
    }

    #[test]
    fn test_second_store_on_same_shape_is_noop() {
        let state = GameState::default();
        let once = reduce(&state, Action::Store).state;
        let twice = reduce(&once, Action::Store);
        assert_eq!(twice.state, once);
        assert!(twice.patch.is_empty());
    }

    #[test]
    fn test_store_swaps_with_held_shape() {
        let state = GameState::default();
        let once = reduce(&state, Action::Store).state;
        // A fresh, unswapped current shape may swap with the held one
        let mut fresh = once.clone();
        fresh.current.swapped = false;

        let swapped = reduce(&fresh, Action::Store);
        assert_eq!(swapped.state.current.kind, TetrominoType::J);
        assert!(swapped.state.current.swapped);
        assert_eq!(swapped.state.store.as_ref().unwrap().kind, TetrominoType::T);
        assert_eq!(swapped.state.blocks_count, once.blocks_count);
        assert_eq!(swapped.state.preview, once.preview);
        assert_eq!(
            swapped.patch.changed_store,
            Some(once.store.as_ref().unwrap().blocks.to_vec())
        );
        assert_eq!(swapped.patch.removed, fresh.current.blocks.to_vec());
    }

    #[test]
    fn test_restart_is_noop_while_playing() {
        let state = GameState::default();
        let next = reduce(&state, Action::Restart);
        assert_eq!(next.state, state);
        assert!(next.patch.is_empty());
    }

    #[test]
    fn test_restart_after_game_end() {
        let mut state = with_blocks(GameState::default(), vec![settled(0, 19), settled(1, 19)]);
        state = reduce(&state, Action::Store).state;
        state.game_end = true;
        state.score.add_clear(7, &Settings::default().timing);
        let count = state.blocks_count;

        let next = reduce(&state, Action::Restart);
        assert!(!next.state.game_end);
        assert!(next.state.blocks.is_empty());
        assert!(next.state.matrix.is_empty());
        assert!(next.state.store.is_none());
        assert_eq!(next.state.blocks_count, count + 8);
        assert_eq!(next.state.score.score, 0);
        assert_eq!(next.state.score.level, 0);
        assert_eq!(next.state.score.speed, 150);
        assert_eq!(next.state.score.high_score, 7);
        assert_eq!(next.state.current.blocks[0].id, format!("{}{count}", next.state.current.kind.id_prefix()));
        assert_eq!(next.patch.changed_preview, state.preview.blocks.to_vec());
        assert_eq!(
            next.patch.changed_store,
            Some(state.store.as_ref().unwrap().blocks.to_vec())
        );
    }

    #[test]
    fn test_actions_after_game_end_are_noops() {
        let mut state = GameState::default();
        state.game_end = true;
        for action in [
            Action::LEFT,
            Action::DOWN,
            Action::Rotate,
            Action::Store,
            Action::Tick { elapsed: 150 },
            Action::Tick { elapsed: 151 },
        ] {
            assert_eq!(reduce(&state, action).state, state, "{action:?}");
        }
    }

    #[test]
    fn test_unvalidated_settings_do_not_panic() {
        let mut settings = Settings::default();
        settings.grid.buffer_rows = 0;
        settings.timing.lines_per_level = 0;
        assert!(settings.validate().is_err());

        let state = GameState::new(Arc::new(settings));
        let blocks = (0..10).map(|x| settled(x, 19)).collect();
        let state = with_blocks(state, blocks);
        let mut state = reduce(&state, Action::Tick { elapsed: 1 }).state;
        assert_eq!(state.score.level, 1);
        assert!(!state.game_end);
        for elapsed in 2..400 {
            state = reduce(&state, Action::Tick { elapsed }).state;
        }
    }

    #[test]
    fn test_game_fold_counts_actions() {
        let mut game = Game::default();
        let snapshot = game.process_action(Action::RIGHT);
        assert_eq!(game.actions(), 1);
        assert_eq!(snapshot.visible.len(), 4);
        assert_eq!(game.state().current.center.x, 5);
    }

    #[test]
    fn test_action_json_shape() {
        let json = serde_json::to_string(&Action::Move { dx: -1, dy: 0 }).unwrap();
        assert_eq!(json, r#"{"type":"Move","dx":-1,"dy":0}"#);
        let back: Action = serde_json::from_str(r#"{"type":"Tick","elapsed":3}"#).unwrap();
        assert_eq!(back, Action::Tick { elapsed: 3 });
    }
}
