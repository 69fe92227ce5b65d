use std::io::{self, Write};

use clap::ValueEnum;
use crossterm::style::{self, Stylize};

/// Terminal rendering mode for a finished RGB8 frame (§6 "Render output").
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    TrueColor,
    HalfBlock,
    Ascii,
    Braille,
}

struct Frame<'a> {
    buffer: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    fn get(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let idx = ((y * self.width + x) * 3) as usize;
        (self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2])
    }
}

pub fn display_frame(buffer: &[u8], width: u32, height: u32, mode: OutputMode) {
    let frame = Frame { buffer, width, height };
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match mode {
        OutputMode::TrueColor => display_truecolor(&mut out, &frame),
        OutputMode::HalfBlock => display_halfblock(&mut out, &frame),
        OutputMode::Ascii => display_ascii(&mut out, &frame),
        OutputMode::Braille => display_braille(&mut out, &frame),
    }
    let _ = out.flush();
}

fn rgb(r: u8, g: u8, b: u8) -> style::Color {
    style::Color::Rgb { r, g, b }
}

/// Rec. 709 luma weights, shared by every mode that collapses a pixel to a
/// single brightness value instead of displaying it in color.
fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

fn display_truecolor(out: &mut impl Write, frame: &Frame) {
    for y in 0..frame.height {
        for x in 0..frame.width {
            let (r, g, b) = frame.get(x, y);
            let _ = write!(out, "{}", "█".with(rgb(r, g, b)));
        }
        let _ = writeln!(out);
    }
}

/// Two vertically stacked source pixels per output row via the half-block
/// glyph's foreground/background split, doubling vertical resolution over
/// [`display_truecolor`].
fn display_halfblock(out: &mut impl Write, frame: &Frame) {
    let rows = frame.height / 2;
    for row in 0..rows {
        for x in 0..frame.width {
            let (tr, tg, tb) = frame.get(x, row * 2);
            let (br, bg, bb) = frame.get(x, row * 2 + 1);
            let _ = write!(out, "{}", "▀".with(rgb(tr, tg, tb)).on(rgb(br, bg, bb)));
        }
        let _ = writeln!(out);
    }
}

fn display_ascii(out: &mut impl Write, frame: &Frame) {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..frame.height {
        for x in 0..frame.width {
            let (r, g, b) = frame.get(x, y);
            let idx = ((luminance(r, g, b) / 255.0).clamp(0.0, 0.999) * RAMP.len() as f64) as usize;
            let _ = write!(out, "{}", RAMP[idx] as char);
        }
        let _ = writeln!(out);
    }
}

/// Braille pattern rendering — each Unicode braille char (U+2800..U+28FF)
/// encodes a 2x4 dot matrix, achieving 2× horizontal and 4× vertical
/// subpixel resolution.
fn display_braille(out: &mut impl Write, frame: &Frame) {
    let cell_w = 2u32;
    let cell_h = 4u32;
    let cols = frame.width / cell_w;
    let rows = frame.height / cell_h;

    let offsets: [(u32, u32, u8); 8] = [
        (0, 0, 0),
        (0, 1, 1),
        (0, 2, 2),
        (1, 0, 3),
        (1, 1, 4),
        (1, 2, 5),
        (0, 3, 6),
        (1, 3, 7),
    ];

    for row in 0..rows {
        for col in 0..cols {
            let bx = col * cell_w;
            let by = row * cell_h;

            let mut pattern: u8 = 0;
            let mut avg = (0u32, 0u32, 0u32);
            let mut lit_count = 0u32;

            for &(dx, dy, bit) in &offsets {
                let px = bx + dx;
                let py = by + dy;
                if px < frame.width && py < frame.height {
                    let (r, g, b) = frame.get(px, py);
                    if luminance(r, g, b) > 0.15 * 255.0 {
                        pattern |= 1 << bit;
                        avg.0 += r as u32;
                        avg.1 += g as u32;
                        avg.2 += b as u32;
                        lit_count += 1;
                    }
                }
            }

            let (r, g, b) = if lit_count > 0 {
                (
                    (avg.0 / lit_count) as u8,
                    (avg.1 / lit_count) as u8,
                    (avg.2 / lit_count) as u8,
                )
            } else {
                (0, 0, 0)
            };

            let braille_char = char::from_u32(0x2800 + pattern as u32).unwrap_or(' ');
            let _ = write!(out, "{}", braille_char.to_string().with(rgb(r, g, b)));
        }
        let _ = writeln!(out);
    }
}

/// Writes a finished frame out as a binary PPM (P6) file.
pub fn write_ppm(path: &std::path::Path, buffer: &[u8], width: u32, height: u32) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write!(file, "P6\n{width} {height}\n255\n")?;
    file.write_all(buffer)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_get_reads_the_right_triplet() {
        let buffer = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let frame = Frame { buffer: &buffer, width: 2, height: 2 };
        assert_eq!(frame.get(0, 0), (1, 2, 3));
        assert_eq!(frame.get(1, 0), (4, 5, 6));
        assert_eq!(frame.get(0, 1), (7, 8, 9));
        assert_eq!(frame.get(1, 1), (10, 11, 12));
    }
}
