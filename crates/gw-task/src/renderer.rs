//! The presentation collaborator the controller drives.
//!
//! The controller talks to the screen only through [`Renderer`], by intent
//! ("put the avatar here", "float this text") rather than by pixels.  It never
//! reads presentation state back, so a renderer can be a canvas, a terminal,
//! a log, or nothing at all ([`NoopRenderer`]).

use gw_core::{Action, Coord};
use gw_mdp::WallSegment;

/// Per-cell tile appearance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileStyle {
    /// Fill colour name.  `None` means the renderer's default fill.
    pub fill: Option<String>,
}

/// Appearance of floating text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill:         String,
    pub stroke:       String,
    pub stroke_width: f32,
}

impl TextStyle {
    /// Label style for a reward: red on white for losses, yellow on black
    /// otherwise.
    pub fn for_reward(reward: f64) -> TextStyle {
        let (fill, stroke) = if reward < 0.0 { ("red", "white") } else { ("yellow", "black") };
        TextStyle {
            fill:         fill.to_string(),
            stroke:       stroke.to_string(),
            stroke_width: 1.5,
        }
    }
}

/// Text shown for a reward: negative values as-is, others with a `+`.
pub fn reward_label(reward: f64) -> String {
    if reward < 0.0 { format!("{reward}") } else { format!("+{reward}") }
}

/// Rendering contract consumed by the controller.
///
/// All methods default to doing nothing, so implementors override only what
/// they draw.
pub trait Renderer {
    /// (Re)draw every tile.  Replaces any previously drawn tiles.
    fn draw_tiles(&mut self, _tiles: &[(Coord, TileStyle)]) {}

    /// Draw decorative wall segments.
    fn draw_walls(&mut self, _walls: &[WallSegment]) {}

    /// Create (or move without animation) the avatar at `at`.
    fn place_avatar(&mut self, _at: Coord) {}

    /// Animate the avatar to `to`.  Return `Some(ms)` if the animation length
    /// differs from the configured one.
    fn animate_avatar_to(&mut self, _to: Coord, _action: Action) -> Option<u64> {
        None
    }

    /// Float `text` above `at` for `anim_ms`.
    fn show_floating_text(&mut self, _at: Coord, _text: &str, _style: &TextStyle, _anim_ms: u64) {}

    fn hide_avatar(&mut self) {}

    fn show_avatar(&mut self) {}

    /// Remove the avatar and any other drawn objects (tiles stay).
    fn clear_objects(&mut self) {}

    /// Stop suppressing default browser/terminal handling of the task keys.
    fn release_keys(&mut self) {}
}

/// A [`Renderer`] that draws nothing.  Use for headless runs and tests that
/// only care about step records.
pub struct NoopRenderer;

impl Renderer for NoopRenderer {}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn draw_tiles(&mut self, tiles: &[(Coord, TileStyle)]) {
        (**self).draw_tiles(tiles)
    }
    fn draw_walls(&mut self, walls: &[WallSegment]) {
        (**self).draw_walls(walls)
    }
    fn place_avatar(&mut self, at: Coord) {
        (**self).place_avatar(at)
    }
    fn animate_avatar_to(&mut self, to: Coord, action: Action) -> Option<u64> {
        (**self).animate_avatar_to(to, action)
    }
    fn show_floating_text(&mut self, at: Coord, text: &str, style: &TextStyle, anim_ms: u64) {
        (**self).show_floating_text(at, text, style, anim_ms)
    }
    fn hide_avatar(&mut self) {
        (**self).hide_avatar()
    }
    fn show_avatar(&mut self) {
        (**self).show_avatar()
    }
    fn clear_objects(&mut self) {
        (**self).clear_objects()
    }
    fn release_keys(&mut self) {
        (**self).release_keys()
    }
}
