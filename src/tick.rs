//! Timer-driven rules: gravity, landing, row clearing and game over
//!
//! A tick whose counter is a multiple of the current speed is a fall step:
//! the shape descends and may lock. Every other tick re-checks the settled
//! blocks for full rows and for a topped-out stack.

use crate::board::Matrix;
use crate::game::{GameState, RenderPatch, Transition};
use crate::selector::new_shape;
use tracing::{debug, info};

impl GameState {
    pub(crate) fn tick(&self, elapsed: u64) -> Transition {
        if self.game_end {
            return self.unchanged();
        }

        if elapsed % self.score.speed.max(1) == 0 {
            self.descend().land()
        } else {
            self.clear_rows().check_game_end()
        }
    }

    /// Drop the current shape one row unless it already rests on something
    fn descend(&self) -> GameState {
        if self.is_landed() {
            return self.clone();
        }
        GameState {
            current: self.current.translated(0, 1),
            ..self.clone()
        }
    }

    /// Spend one step of land delay, or lock the shape once it is exhausted
    fn land(self) -> Transition {
        if !self.is_landed() {
            return Transition {
                state: self,
                patch: RenderPatch::default(),
            };
        }

        if self.current.land_delay > 0 {
            let mut current = self.current.clone();
            current.land_delay -= 1;
            return self.with_current(current);
        }

        let settings = self.settings();
        let mut blocks = self.blocks.clone();
        blocks.extend(self.current.blocks.iter().cloned());
        let matrix = Matrix::rebuild(&blocks, settings);
        let current = self.preview.recentered(
            settings.spawn.current,
            false,
            settings.timing.land_delay,
        );
        let preview = new_shape(settings.spawn.preview, self.blocks_count, settings);
        debug!(
            kind = ?self.current.kind,
            blocks_count = self.blocks_count,
            settled = blocks.len(),
            "shape locked"
        );

        let changed_preview = self.preview.blocks.to_vec();
        Transition {
            state: GameState {
                current,
                preview,
                blocks,
                matrix,
                blocks_count: self.blocks_count + 4,
                ..self
            },
            patch: RenderPatch {
                changed_preview,
                ..RenderPatch::default()
            },
        }
    }

    /// Remove every full row and let the blocks above collapse into the gaps
    fn clear_rows(&self) -> Transition {
        let full = self.matrix.full_rows();
        if full.is_empty() {
            return self.unchanged();
        }

        let (removed, kept): (Vec<_>, Vec<_>) = self
            .blocks
            .iter()
            .cloned()
            .partition(|block| full.contains(&block.position.y));
        let blocks: Vec<_> = kept
            .into_iter()
            .map(|block| {
                let drop = full.iter().filter(|&&row| row > block.position.y).count();
                block.shifted(0, drop as i32)
            })
            .collect();

        let settings = self.settings();
        let matrix = Matrix::rebuild(&blocks, settings);
        let mut score = self.score.clone();
        score.add_clear(full.len() as u64, &settings.timing);
        debug!(
            rows = ?full,
            score = score.score,
            level = score.level,
            speed = score.speed,
            "rows cleared"
        );

        Transition {
            state: GameState {
                blocks,
                matrix,
                score,
                ..self.clone()
            },
            patch: RenderPatch {
                removed,
                ..RenderPatch::default()
            },
        }
    }
}

impl Transition {
    /// End the game when a settled block reached the hidden rows
    fn check_game_end(self) -> Transition {
        let Transition { state, mut patch } = self;
        if !state.matrix.is_topped_out() {
            return Transition { state, patch };
        }

        info!(
            score = state.score.score,
            high_score = state.score.high_score,
            "game over"
        );
        patch.removed.extend(state.blocks.iter().cloned());
        patch.removed.extend(state.current.blocks.iter().cloned());
        Transition {
            state: GameState {
                game_end: true,
                ..state
            },
            patch,
        }
    }
}
