//! Virtual stylus cursor.

use crate::console::{Console, SCREEN_HEIGHT, SCREEN_WIDTH, Screen};

pub const CURSOR_SIZE: usize = 11;
/// Distance from the mask's top-left corner to its hotspot.
pub const CURSOR_OFFSET: i32 = 5;
pub const CURSOR_COLOR: u32 = 0xFFFF_FFFF;

/// Ring with a small cross at the hotspot.
#[rustfmt::skip]
pub const CURSOR_MASK: [[u8; CURSOR_SIZE]; CURSOR_SIZE] = [
    [0,0,0,1,1,1,1,1,0,0,0],
    [0,0,1,0,0,0,0,0,1,0,0],
    [0,1,0,0,0,0,0,0,0,1,0],
    [1,0,0,0,0,0,0,0,0,0,1],
    [1,0,0,0,0,1,0,0,0,0,1],
    [1,0,0,0,1,1,1,0,0,0,1],
    [1,0,0,0,0,1,0,0,0,0,1],
    [1,0,0,0,0,0,0,0,0,0,1],
    [0,1,0,0,0,0,0,0,0,1,0],
    [0,0,1,0,0,0,0,0,1,0,0],
    [0,0,0,1,1,1,1,1,0,0,0],
];

/// Cursor state published alongside each frame.
///
/// With the accelerated renderer this is all the compositor gets; the
/// software path also has the cursor blitted into the framebuffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorOverlay {
    pub visible: bool,
    pub x: u16,
    pub y: u16,
}

impl CursorOverlay {
    pub const HIDDEN: CursorOverlay = CursorOverlay {
        visible: false,
        x: 0,
        y: 0,
    };

    pub fn at(x: u16, y: u16) -> Self {
        Self {
            visible: true,
            x,
            y,
        }
    }
}

/// Blit the cursor mask centred on `(x, y)`, dropping pixels outside the
/// 256x192 screen.
pub fn blit_cursor(pixels: &mut [u32], stride: usize, x: i32, y: i32) {
    for (row, line) in CURSOR_MASK.iter().enumerate() {
        let py = y + row as i32 - CURSOR_OFFSET;
        if !(0..SCREEN_HEIGHT as i32).contains(&py) {
            continue;
        }
        for (col, &bit) in line.iter().enumerate() {
            let px = x + col as i32 - CURSOR_OFFSET;
            if bit == 0 || !(0..SCREEN_WIDTH as i32).contains(&px) {
                continue;
            }
            if let Some(pixel) = pixels.get_mut(py as usize * stride + px as usize) {
                *pixel = CURSOR_COLOR;
            }
        }
    }
}

/// Draw the cursor onto the bottom screen of both framebuffer copies.
///
/// Does nothing for the accelerated renderer, whose output is composited
/// from [`CursorOverlay`] instead.
pub fn draw<C: Console + ?Sized>(console: &mut C, cursor: &CursorOverlay) {
    if !cursor.visible || console.is_renderer_accelerated() {
        return;
    }
    for buffer in 0..2 {
        let pixels = console.framebuffer_mut(buffer, Screen::Bottom);
        blit_cursor(pixels, SCREEN_WIDTH, i32::from(cursor.x), i32::from(cursor.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Vec<u32> {
        vec![0; SCREEN_WIDTH * SCREEN_HEIGHT]
    }

    fn lit(pixels: &[u32]) -> usize {
        pixels.iter().filter(|p| **p == CURSOR_COLOR).count()
    }

    #[test]
    fn full_cursor_in_the_middle() {
        let mut pixels = screen();
        blit_cursor(&mut pixels, SCREEN_WIDTH, 128, 96);
        let expected: usize = CURSOR_MASK.iter().flatten().map(|b| usize::from(*b)).sum();
        assert_eq!(lit(&pixels), expected);
        assert_eq!(pixels[96 * SCREEN_WIDTH + 128], CURSOR_COLOR);
        assert_eq!(pixels[91 * SCREEN_WIDTH + 128], CURSOR_COLOR);
    }

    #[test]
    fn clipped_at_the_corner() {
        let mut pixels = screen();
        blit_cursor(&mut pixels, SCREEN_WIDTH, 255, 191);
        // Only the top-left quadrant of the ring (plus centre cross) lands.
        assert!(lit(&pixels) > 0);
        assert!(lit(&pixels) < 20);
        assert_eq!(pixels[191 * SCREEN_WIDTH + 255], CURSOR_COLOR);

        let mut pixels = screen();
        blit_cursor(&mut pixels, SCREEN_WIDTH, -20, 50);
        assert_eq!(lit(&pixels), 0);
    }

    #[test]
    fn does_not_wrap_into_the_next_row() {
        let mut pixels = screen();
        blit_cursor(&mut pixels, SCREEN_WIDTH, 0, 96);
        for y in 0..SCREEN_HEIGHT {
            let row = &pixels[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH];
            assert!(row[SCREEN_WIDTH - 8..].iter().all(|p| *p == 0));
        }
    }
}
