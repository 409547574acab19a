#![forbid(unsafe_code)]

//! Stickers: short text pinned at a fixed position above the output.

use candela_core::surface::Position;
use candela_text::{display_width, truncate_to_width};

/// A pinned piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sticker {
    pub text: String,
    pub position: Position,
}

impl Sticker {
    /// Column and visible text when drawn on a surface `cols` wide: shifted
    /// left to fit, truncated when wider than the surface.
    pub fn fit(&self, cols: u16) -> (u16, String) {
        let width = display_width(&self.text);
        let cols_usize = usize::from(cols);
        if width >= cols_usize {
            return (0, truncate_to_width(&self.text, cols_usize));
        }
        let max_col = cols_usize - width;
        let col = usize::from(self.position.col).min(max_col);
        (u16::try_from(col).unwrap_or(0), self.text.clone())
    }
}

/// Ordered set of stickers.
#[derive(Debug, Clone, Default)]
pub struct StickerBoard {
    stickers: Vec<Sticker>,
}

impl StickerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place or replace a sticker.
    ///
    /// The sticker shows `replacement` when one is given, `text` otherwise.
    /// If a sticker already shows `text`, the new one takes its position.
    /// Otherwise it goes at `position`, or at `fallback` when none is given.
    pub fn place(
        &mut self,
        text: &str,
        replacement: Option<&str>,
        position: Option<Position>,
        fallback: Position,
    ) {
        let shown = replacement.filter(|r| !r.is_empty()).unwrap_or(text).to_string();
        let position = match self.stickers.iter().position(|s| s.text == text) {
            Some(idx) => self.stickers.remove(idx).position,
            None => position.unwrap_or(fallback),
        };
        self.stickers.push(Sticker {
            text: shown,
            position,
        });
    }

    /// Drop every sticker showing `text`. Returns how many were removed.
    pub fn remove(&mut self, text: &str) -> usize {
        let before = self.stickers.len();
        self.stickers.retain(|s| s.text != text);
        before - self.stickers.len()
    }

    /// Lowest row any sticker sits on.
    pub fn lowest_row(&self) -> Option<u16> {
        self.stickers.iter().map(|s| s.position.row).max()
    }

    pub fn get(&self, text: &str) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.text == text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sticker> {
        self.stickers.iter()
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }
}
