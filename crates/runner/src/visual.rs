//! Visual regression: screenshot comparison against baselines
//!
//! Baselines are addressed by group-relative paths (`woo/shop.png`),
//! mirroring the page registry's addressing scheme. A missing baseline
//! is not a failure: the first capture is recorded as the baseline.

use std::path::{Path, PathBuf};

use image::{GenericImageView, Pixel, RgbaImage};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{RunnerError, RunnerResult};

/// Per-channel difference below this is ignored (anti-aliasing,
/// compression artifacts).
const CHANNEL_TOLERANCE: i32 = 5;

/// Result of comparing one screenshot against its baseline.
#[derive(Debug, Clone)]
pub struct VisualDiff {
    /// True when no baseline existed and this capture became it.
    pub new_baseline: bool,

    /// Whether the images match within the threshold.
    pub matches: bool,

    /// Percentage of pixels that differ.
    pub diff_percent: f64,

    pub diff_pixels: u64,
    pub total_pixels: u64,

    /// Diff artifact, written when any pixel differs.
    pub diff_image_path: Option<PathBuf>,

    pub actual_hash: String,
    pub baseline_hash: String,
}

impl VisualDiff {
    fn exact(total_pixels: u64, hash: String) -> Self {
        Self {
            new_baseline: false,
            matches: true,
            diff_percent: 0.0,
            diff_pixels: 0,
            total_pixels,
            diff_image_path: None,
            actual_hash: hash.clone(),
            baseline_hash: hash,
        }
    }
}

/// Configuration for visual comparison.
#[derive(Debug, Clone)]
pub struct VisualConfig {
    pub baseline_dir: PathBuf,
    pub actual_dir: PathBuf,
    pub diff_dir: PathBuf,

    /// Tolerated pixel-difference percentage (0.0 - 100.0).
    pub threshold: f64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("baselines"),
            actual_dir: PathBuf::from("reports/actual"),
            diff_dir: PathBuf::from("reports/diffs"),
            threshold: 0.2,
        }
    }
}

/// Screenshot comparison against the baseline set.
pub struct VisualTester {
    baseline_dir: PathBuf,
    actual_dir: PathBuf,
    diff_dir: PathBuf,
    threshold: f64,
}

impl VisualTester {
    pub fn new(config: VisualConfig) -> RunnerResult<Self> {
        std::fs::create_dir_all(&config.baseline_dir)?;
        std::fs::create_dir_all(&config.actual_dir)?;
        std::fs::create_dir_all(&config.diff_dir)?;

        Ok(Self {
            baseline_dir: config.baseline_dir,
            actual_dir: config.actual_dir,
            diff_dir: config.diff_dir,
            threshold: config.threshold,
        })
    }

    pub fn actual_dir(&self) -> &Path {
        &self.actual_dir
    }

    /// Compare the captured screenshot at `rel` (e.g. `woo/shop.png`)
    /// against its baseline. With no baseline on disk, the capture is
    /// recorded as the new baseline and reported as such.
    pub fn compare(&self, rel: &str, threshold: Option<f64>) -> RunnerResult<VisualDiff> {
        let threshold = threshold.unwrap_or(self.threshold);
        let actual_path = self.actual_dir.join(rel);
        let baseline_path = self.baseline_dir.join(rel);

        if !actual_path.exists() {
            return Err(RunnerError::ScreenshotMissing(
                actual_path.to_string_lossy().to_string(),
            ));
        }

        if !baseline_path.exists() {
            info!("Recording new baseline: {}", rel);
            if let Some(parent) = baseline_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&actual_path, &baseline_path)?;

            let hash = hash_file(&actual_path)?;
            return Ok(VisualDiff {
                new_baseline: true,
                ..VisualDiff::exact(0, hash)
            });
        }

        let actual_hash = hash_file(&actual_path)?;
        let baseline_hash = hash_file(&baseline_path)?;

        let actual_img = image::open(&actual_path)?;

        if actual_hash == baseline_hash {
            debug!("Screenshots match exactly (same hash): {}", rel);
            let total = (actual_img.width() as u64) * (actual_img.height() as u64);
            return Ok(VisualDiff::exact(total, actual_hash));
        }

        let baseline_img = image::open(&baseline_path)?;

        let (aw, ah) = actual_img.dimensions();
        let (bw, bh) = baseline_img.dimensions();
        if (aw, ah) != (bw, bh) {
            warn!(
                "Screenshot dimensions differ for {}: actual {}x{} vs baseline {}x{}",
                rel, aw, ah, bw, bh
            );
        }

        let actual_rgba = actual_img.to_rgba8();
        let baseline_rgba = baseline_img.to_rgba8();

        // Compare over the union; pixels outside the overlap count as
        // differing.
        let width = aw.max(bw);
        let height = ah.max(bh);
        let total_pixels = (width as u64) * (height as u64);
        let overlap_w = aw.min(bw);
        let overlap_h = ah.min(bh);

        let mut diff_img = RgbaImage::new(aw, ah);
        let mut diff_pixels = total_pixels - (overlap_w as u64) * (overlap_h as u64);

        for y in 0..overlap_h {
            for x in 0..overlap_w {
                let actual_pixel = actual_rgba.get_pixel(x, y);
                let baseline_pixel = baseline_rgba.get_pixel(x, y);

                if pixels_differ(actual_pixel, baseline_pixel) {
                    diff_pixels += 1;
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                } else {
                    // Keep the original, dimmed, as context
                    let channels = actual_pixel.channels();
                    diff_img.put_pixel(
                        x,
                        y,
                        image::Rgba([channels[0] / 2, channels[1] / 2, channels[2] / 2, 128]),
                    );
                }
            }
        }

        let diff_percent = (diff_pixels as f64 / total_pixels as f64) * 100.0;
        let matches = diff_percent <= threshold;

        let diff_image_path = if diff_pixels > 0 {
            let path = self.diff_dir.join(diff_artifact_name(rel));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            diff_img.save(&path)?;
            Some(path)
        } else {
            None
        };

        if !matches {
            warn!(
                "Visual regression in '{}': {:.3}% pixels differ (threshold: {:.3}%)",
                rel, diff_percent, threshold
            );
        }

        Ok(VisualDiff {
            new_baseline: false,
            matches,
            diff_percent,
            diff_pixels,
            total_pixels,
            diff_image_path,
            actual_hash,
            baseline_hash,
        })
    }

    /// Replace the baseline at `rel` with the current capture.
    pub fn update_baseline(&self, rel: &str) -> RunnerResult<()> {
        let actual_path = self.actual_dir.join(rel);
        let baseline_path = self.baseline_dir.join(rel);

        if !actual_path.exists() {
            return Err(RunnerError::ScreenshotMissing(
                actual_path.to_string_lossy().to_string(),
            ));
        }

        if let Some(parent) = baseline_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&actual_path, &baseline_path)?;
        info!("Updated baseline: {}", rel);
        Ok(())
    }

    /// Copy every captured screenshot over its baseline. Returns the
    /// updated relative paths.
    pub fn update_all(&self) -> RunnerResult<Vec<String>> {
        let mut updated = Vec::new();
        for entry in walkdir::WalkDir::new(&self.actual_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "png").unwrap_or(false))
        {
            let rel = entry
                .path()
                .strip_prefix(&self.actual_dir)
                .expect("walkdir yields children of actual_dir")
                .to_string_lossy()
                .to_string();
            self.update_baseline(&rel)?;
            updated.push(rel);
        }
        Ok(updated)
    }

    /// Remove diff artifacts from previous runs.
    pub fn clean_diffs(&self) -> RunnerResult<()> {
        for entry in walkdir::WalkDir::new(&self.diff_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            std::fs::remove_file(entry.path())?;
        }
        Ok(())
    }
}

fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>) -> bool {
    let a_channels = a.channels();
    let b_channels = b.channels();

    for i in 0..4 {
        let diff = (a_channels[i] as i32 - b_channels[i] as i32).abs();
        if diff > CHANNEL_TOLERANCE {
            return true;
        }
    }
    false
}

/// `woo/shop.png` becomes `woo/shop-diff.png`.
fn diff_artifact_name(rel: &str) -> String {
    match rel.strip_suffix(".png") {
        Some(stem) => format!("{}-diff.png", stem),
        None => format!("{}-diff.png", rel),
    }
}

fn hash_file(path: &Path) -> RunnerResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}
