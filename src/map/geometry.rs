use crate::braille::BrailleCanvas;

/// Bresenham line between two dot positions
pub fn draw_line(canvas: &mut BrailleCanvas, from: (i32, i32), to: (i32, i32)) {
    let (x1, y1) = to;
    let dx = (x1 - from.0).abs();
    let dy = -(y1 - from.1).abs();
    let sx = if from.0 < x1 { 1 } else { -1 };
    let sy = if from.1 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = from;

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Ring of dots around a pin, used for the selection halo
pub fn draw_ring(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    let inner = (radius - 1) * (radius - 1);
    let outer = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d = dx * dx + dy * dy;
            if d <= outer && d > inner {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, (0, 0), (9, 0));
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, (0, 0), (0, 7));
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_line_off_canvas_is_clipped() {
        let mut canvas = BrailleCanvas::new(1, 1);
        draw_line(&mut canvas, (-4, 0), (1, 0));
        assert_eq!(canvas.to_string(), "⠉");
    }

    #[test]
    fn test_ring_leaves_center_empty() {
        let mut canvas = BrailleCanvas::new(4, 2);
        draw_ring(&mut canvas, 4, 4, 2);
        // center dot (4, 4) sits in cell (2, 1) at bit 0x01
        let cell = canvas.char_at(2, 1).unwrap() as u32 - 0x2800;
        assert_eq!(cell & 0x01, 0);
    }
}
