use std::path::Path;

use image::{Rgb, RgbImage, imageops};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut},
    rect::Rect,
};
use log::info;

use crate::{
    CompressionResult,
    error::Result,
    report::font::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph},
};

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub background: Rgb<u8>,
    pub label_color: Rgb<u8>,
    pub border_color: Rgb<u8>,
    pub padding: u32,
    /// Pixel size of one glyph dot.
    pub label_scale: u32,
    pub border_thickness: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            background: Rgb([40, 40, 40]),
            label_color: Rgb([255, 255, 255]),
            border_color: Rgb([90, 90, 90]),
            padding: 10,
            label_scale: 2,
            border_thickness: 1,
        }
    }
}

pub struct Visualizer {
    config: VisualizationConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self { config: VisualizationConfig::default() }
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// Original and reconstruction side by side, titled the way the
    /// compression run reports them.
    pub fn render_comparison(
        &self,
        original: &RgbImage,
        reconstructed: &RgbImage,
        n_components: usize,
    ) -> RgbImage {
        let title = format!("Compressed Image (n_components={})", n_components);
        self.create_comparison(&[("Original Image", original), (title.as_str(), reconstructed)])
    }

    pub fn save_comparison<P: AsRef<Path>>(
        &self,
        result: &CompressionResult,
        path: P,
    ) -> Result<()> {
        let figure = self.render_comparison(
            &result.original,
            &result.reconstructed,
            result.n_components(),
        );
        figure.save(&path)?;
        info!("Saved comparison figure to {}", path.as_ref().display());
        Ok(())
    }

    pub fn create_comparison(&self, images: &[(&str, &RgbImage)]) -> RgbImage {
        if images.is_empty() {
            return RgbImage::new(1, 1);
        }

        let padding = self.config.padding;
        let label_height = self.label_height();

        let columns = images
            .iter()
            .map(|(label, img)| img.width().max(self.text_width(label)))
            .collect::<Vec<_>>();
        let max_height = images
            .iter()
            .map(|(_, img)| img.height())
            .max()
            .unwrap_or(0);

        let total_width = columns.iter().sum::<u32>() + padding * (images.len() as u32 + 1);
        let total_height = max_height + label_height + padding * 3;

        let mut result = RgbImage::from_pixel(total_width, total_height, self.config.background);

        let mut x_offset = padding;
        for ((label, img), column) in images.iter().zip(columns) {
            let label_x = x_offset + (column - self.text_width(label)) / 2;
            self.draw_label(&mut result, label_x, padding, label, self.config.label_color);

            let image_x = x_offset + (column - img.width()) / 2;
            let image_y = padding * 2 + label_height;
            self.draw_border(&mut result, image_x, image_y, img.width(), img.height());
            imageops::overlay(&mut result, *img, image_x as i64, image_y as i64);

            x_offset += column + padding;
        }

        result
    }

    fn label_height(&self) -> u32 {
        GLYPH_HEIGHT * self.scale()
    }

    fn scale(&self) -> u32 {
        self.config.label_scale.max(1)
    }

    pub fn text_width(&self, text: &str) -> u32 {
        let count = text.chars().count() as u32;
        if count == 0 {
            return 0;
        }
        (count * (GLYPH_WIDTH + 1) - 1) * self.scale()
    }

    fn draw_label(&self, image: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
        let scale = self.scale();

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else {
                continue;
            };
            let cx = x + i as u32 * (GLYPH_WIDTH + 1) * scale;

            for (dy, bits) in rows.iter().enumerate() {
                for dx in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - dx)) == 0 {
                        continue;
                    }
                    let rect = Rect::at((cx + dx * scale) as i32, (y + dy as u32 * scale) as i32)
                        .of_size(scale, scale);
                    draw_filled_rect_mut(image, rect, color);
                }
            }
        }
    }

    fn draw_border(&self, image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32) {
        for t in 1..=self.config.border_thickness {
            let rect = Rect::at(x as i32 - t as i32, y as i32 - t as i32)
                .of_size(width + 2 * t, height + 2 * t);
            draw_hollow_rect_mut(image, rect, self.config.border_color);
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
