use std::io;
use std::io::Write;
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// A buffer of RGBA pixels, the render target.
///
/// Channel values are handed in as floats in `[0, 1]`, quantized to 8 bits
/// on write and rescaled to `[0, 1]` on read. Allocated once per render
/// target and mutated pixel-by-pixel while rendering; the alpha channel is
/// always fully opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Creates an opaque black buffer with the given dimensions.
    pub fn new(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Writes a color to a pixel, clamping channels to `[0, 1]` and
    /// quantizing to 8 bits. Out-of-bounds pixels are silently ignored.
    pub fn set_color(&mut self, x: usize, y: usize, color: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        let quantize = |c: f64| (255.0 * c.clamp(0.0, 1.0)).round() as u8;
        self.pixels[(y * self.width) + x] = [
            quantize(color.r),
            quantize(color.g),
            quantize(color.b),
            255,
        ];
    }

    /// Reads a pixel back as a color with channels rescaled to `[0, 1]`.
    /// Returns `None` for out-of-bounds pixels.
    pub fn get_color(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let [r, g, b, _] = self.pixels[(y * self.width) + x];
        Some(Color::rgb(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
        ))
    }

    /// Saves the buffer to a PPM file.
    ///
    /// Lines in the PPM file are clamped to 70 columns. If some color would
    /// exceed the 70 column mark on a line, it is moved to the next line.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = File::create(path)?;

        // PPM header and metadata.
        writeln!(&mut out, "P3")?;
        writeln!(&mut out, "{} {}", self.width, self.height)?;
        writeln!(&mut out, "255")?;

        let mut col = 1;
        for pixel in self.pixels.iter() {
            let r_str = pixel[0].to_string();
            let g_str = pixel[1].to_string();
            let b_str = pixel[2].to_string();

            // Check if any channel surpasses the 70 column marker.
            if col + r_str.len() > 70 {
                write!(&mut out, "\n{} {} {}", r_str, g_str, b_str)?;
                col = r_str.len() + g_str.len() + b_str.len() + 3;
            } else if col + r_str.len() + g_str.len() > 70 {
                write!(&mut out, " {}\n{} {}", r_str, g_str, b_str)?;
                col = g_str.len() + b_str.len() + 2;
            } else if col + r_str.len() + g_str.len() + b_str.len() > 70 {
                write!(&mut out, " {} {}\n{}", r_str, g_str, b_str)?;
                col = b_str.len() + 1;
            } else {
                if col != 1 {
                    write!(&mut out, " ")?;
                    col += 1;
                }

                write!(&mut out, "{} {} {}", r_str, g_str, b_str)?;
                col += r_str.len() + g_str.len() + b_str.len() + 2;
            }
        }

        // Terminate the PPM file with a newline.
        write!(&mut out, "\n")?;

        Ok(())
    }
}

/* Tests */

#[test]
fn new_buffer_is_black() {
    let buffer = PixelBuffer::new(4, 3);

    assert_eq!(buffer.width(), 4);
    assert_eq!(buffer.height(), 3);
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(buffer.get_color(x, y).unwrap(), Color::black());
        }
    }
}

#[test]
fn write_then_read_pixel() {
    let mut buffer = PixelBuffer::new(8, 8);
    let purple = Color::rgb(1.0, 0.0, 1.0);

    buffer.set_color(4, 2, &purple);
    assert_eq!(buffer.get_color(4, 2).unwrap(), purple);
}

#[test]
fn write_quantizes_to_8_bits() {
    let mut buffer = PixelBuffer::new(1, 1);

    buffer.set_color(0, 0, &Color::rgb(0.5, 0.25, 0.75));
    let read = buffer.get_color(0, 0).unwrap();

    assert_eq!(read, Color::rgb(128.0 / 255.0, 64.0 / 255.0, 191.0 / 255.0));
}

#[test]
fn write_clamps_out_of_range_channels() {
    let mut buffer = PixelBuffer::new(1, 1);

    buffer.set_color(0, 0, &Color::rgb(2.5, -1.0, 1.0));
    assert_eq!(buffer.get_color(0, 0).unwrap(), Color::rgb(1.0, 0.0, 1.0));
}

#[test]
fn out_of_bounds_writes_are_ignored() {
    let mut buffer = PixelBuffer::new(2, 2);

    buffer.set_color(5, 5, &Color::white());
    assert!(buffer.get_color(5, 5).is_none());
    assert_eq!(buffer.get_color(1, 1).unwrap(), Color::black());
}
