//! PNG summary card rendering.
//!
//! After every successful refresh the pipeline re-renders an 800x600 card
//! showing the country count, the refresh timestamp and the top five
//! countries by estimated GDP. Rendering is best-effort: callers log
//! failures and never let them fail the refresh.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use time::OffsetDateTime;
use tracing::info;

use crate::config::Config;
use crate::error::SummaryError;
use crate::model::Country;
use crate::utils::format_timestamp;

/// Card width in pixels.
pub const IMAGE_WIDTH: u32 = 800;
/// Card height in pixels.
pub const IMAGE_HEIGHT: u32 = 600;
/// File name inside the cache directory.
pub const IMAGE_FILE: &str = "summary.png";
/// How many top-GDP countries the card lists.
pub const TOP_COUNT: usize = 5;

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
const FOREGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// System font locations tried when no FONT_PATH is configured.
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Renders the summary card into the cache directory.
#[derive(Debug, Clone)]
pub struct SummaryRenderer {
    cache_dir: PathBuf,
    font_path: Option<PathBuf>,
}

impl SummaryRenderer {
    /// Create a renderer from config.
    pub fn new(config: &Config) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
            font_path: config.font_path.clone(),
        }
    }

    /// Where the card is written; also the path served by the image endpoint.
    pub fn image_path(&self) -> PathBuf {
        self.cache_dir.join(IMAGE_FILE)
    }

    /// Render and write the card.
    pub fn generate(
        &self,
        total_countries: i64,
        top: &[Country],
        refreshed_at: OffsetDateTime,
    ) -> Result<PathBuf, SummaryError> {
        std::fs::create_dir_all(&self.cache_dir).map_err(|cause| SummaryError::CacheDir {
            path: self.cache_dir.display().to_string(),
            cause,
        })?;

        let font = self.load_font()?;
        let mut canvas = RgbImage::from_pixel(IMAGE_WIDTH, IMAGE_HEIGHT, BACKGROUND);

        let title = PxScale::from(36.0);
        let body = PxScale::from(24.0);

        draw_text_mut(
            &mut canvas,
            FOREGROUND,
            210,
            40,
            title,
            &font,
            "Country Data Summary",
        );

        draw_text_mut(
            &mut canvas,
            FOREGROUND,
            50,
            120,
            body,
            &font,
            &format!("Total Countries: {}", total_countries),
        );

        let refreshed =
            format_timestamp(refreshed_at).unwrap_or_else(|_| "unknown".to_string());
        draw_text_mut(
            &mut canvas,
            FOREGROUND,
            50,
            160,
            body,
            &font,
            &format!("Last Refreshed: {}", refreshed),
        );

        draw_text_mut(
            &mut canvas,
            FOREGROUND,
            50,
            220,
            body,
            &font,
            "Top 5 Countries by Estimated GDP:",
        );

        let mut y = 260;
        for (rank, country) in top.iter().take(TOP_COUNT).enumerate() {
            let gdp = match country.estimated_gdp {
                Some(gdp) => format!("{:.2}", gdp),
                None => "N/A".to_string(),
            };
            draw_text_mut(
                &mut canvas,
                FOREGROUND,
                70,
                y,
                body,
                &font,
                &format!("{}. {} (GDP: {})", rank + 1, country.name, gdp),
            );
            y += 30;
        }

        let path = self.image_path();
        canvas.save(&path)?;
        info!(path = %path.display(), "summary image generated");
        Ok(path)
    }

    /// Load the configured font, falling back to common system fonts.
    fn load_font(&self) -> Result<FontVec, SummaryError> {
        if let Some(path) = &self.font_path {
            return load_font_file(path);
        }

        for candidate in FALLBACK_FONTS {
            let path = Path::new(candidate);
            if path.exists() {
                return load_font_file(path);
            }
        }

        Err(SummaryError::FontUnavailable)
    }
}

fn load_font_file(path: &Path) -> Result<FontVec, SummaryError> {
    let bytes = std::fs::read(path).map_err(|_| SummaryError::FontInvalid {
        path: path.display().to_string(),
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| SummaryError::FontInvalid {
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn renderer(cache_dir: &Path) -> SummaryRenderer {
        SummaryRenderer {
            cache_dir: cache_dir.to_path_buf(),
            font_path: None,
        }
    }

    fn sample_country(name: &str, gdp: Option<f64>) -> Country {
        Country {
            id: 1,
            name: name.to_string(),
            capital: None,
            region: None,
            population: 1,
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: gdp,
            flag_url: None,
            last_refreshed_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn image_path_is_inside_cache_dir() {
        let renderer = renderer(Path::new("cache"));
        assert_eq!(renderer.image_path(), PathBuf::from("cache/summary.png"));
    }

    #[test]
    fn missing_configured_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = SummaryRenderer {
            cache_dir: dir.path().to_path_buf(),
            font_path: Some(dir.path().join("nope.ttf")),
        };
        assert!(matches!(
            renderer.load_font(),
            Err(SummaryError::FontInvalid { .. })
        ));
    }

    #[test]
    fn generates_png_when_a_system_font_exists() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());

        if renderer.load_font().is_err() {
            println!("Skipping: no system font available");
            return;
        }

        let top = vec![
            sample_country("Richland", Some(9.0e12)),
            sample_country("Unknownia", None),
        ];
        let path = renderer
            .generate(2, &top, OffsetDateTime::UNIX_EPOCH)
            .unwrap();

        let bytes = std::fs::read(path).unwrap();
        // PNG magic number.
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
