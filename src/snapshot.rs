//! Render snapshot emitted after every action

use crate::game::{GameState, RenderPatch};
use crate::piece::Block;
use crate::tetromino::Style;
use serde::Serialize;

/// A block as the render layer draws it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub id: String,
    pub width: f32,
    pub height: f32,
    /// Grid column and row
    pub x: i32,
    pub y: i32,
    /// Pixel offset on its surface
    pub pixel_x: f32,
    pub pixel_y: f32,
    pub style: Style,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id.clone(),
            width: block.width,
            height: block.height,
            x: block.position.x,
            y: block.position.y,
            pixel_x: block.position.x as f32 * block.width,
            pixel_y: block.position.y as f32 * block.height,
            style: block.style,
        }
    }
}

fn views<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Vec<BlockView> {
    blocks.into_iter().map(BlockView::from).collect()
}

/// Everything the render layer needs for one step. The `removed`,
/// `changed_preview` and `changed_store` lists apply to this step only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub visible: Vec<BlockView>,
    pub removed: Vec<BlockView>,
    pub preview: Vec<BlockView>,
    pub changed_preview: Vec<BlockView>,
    pub store: Option<Vec<BlockView>>,
    pub changed_store: Option<Vec<BlockView>>,
    pub score: u64,
    pub high_score: u64,
    pub level: u64,
    pub game_end: bool,
}

impl Snapshot {
    pub fn capture(state: &GameState, patch: &RenderPatch) -> Self {
        Self {
            visible: views(state.visible_blocks()),
            removed: views(&patch.removed),
            preview: views(&state.preview.blocks),
            changed_preview: views(&patch.changed_preview),
            store: state.store.as_ref().map(|held| views(&held.blocks)),
            changed_store: patch.changed_store.as_ref().map(|blocks| views(blocks)),
            score: state.score.score,
            high_score: state.score.high_score,
            level: state.score.level,
            game_end: state.game_end,
        }
    }
}
