//! Test fixture helpers for creating temporary test data.
//!
//! Images are encoded in memory with `image` so tests never depend on
//! checked-in binaries.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use gallery::pipeline::RawFile;

pub const MIB: usize = 1024 * 1024;

/// Solid-color image encoded as `format`. `seed` varies the color so two
/// fixtures with different seeds never share bytes.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn encoded_image(format: ImageFormat, seed: u8, size: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(
        size,
        size,
        Rgb([seed, seed.wrapping_mul(7), 255_u8.wrapping_sub(seed)]),
    );
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format)
        .unwrap_or_else(|e| panic!("Failed to encode {format:?}: {e}"));
    bytes.into_inner()
}

#[must_use]
pub fn png_bytes(seed: u8) -> Vec<u8> {
    encoded_image(ImageFormat::Png, seed, 8)
}

#[must_use]
pub fn jpeg_bytes(seed: u8) -> Vec<u8> {
    encoded_image(ImageFormat::Jpeg, seed, 8)
}

#[must_use]
pub fn gif_bytes(seed: u8) -> Vec<u8> {
    encoded_image(ImageFormat::Gif, seed, 8)
}

/// `len` bytes whose content is unique per `seed`.
#[must_use]
pub fn sized_bytes(len: usize, seed: u8) -> Vec<u8> {
    let mut bytes = vec![seed; len];
    if let Some(first) = bytes.first_mut() {
        *first = seed.wrapping_add(1);
    }
    bytes
}

/// In-memory PNG candidate.
#[must_use]
pub fn png_file(name: &str, seed: u8) -> RawFile {
    RawFile::from_bytes(name, "image/png", png_bytes(seed))
}

/// In-memory candidate of exactly `len` bytes.
#[must_use]
pub fn sized_file(name: &str, media_type: &str, len: usize, seed: u8) -> RawFile {
    RawFile::from_bytes(name, media_type, sized_bytes(len, seed))
}

/// Temporary configuration file.
pub struct TestConfig {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl TestConfig {
    fn write(name: &str, content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = dir.path().join(name);
        std::fs::write(&config_path, content).expect("Failed to write config file");
        Self { dir, config_path }
    }

    #[must_use]
    pub fn yaml(content: &str) -> Self {
        Self::write("config.yaml", content)
    }

    #[must_use]
    pub fn toml(content: &str) -> Self {
        Self::write("config.toml", content)
    }

    /// # Panics
    ///
    /// Panics if the path is not valid UTF-8.
    #[must_use]
    pub fn path_str(&self) -> &str {
        self.config_path.to_str().expect("Path is not valid UTF-8")
    }
}

/// Temporary directory for files a test writes.
pub struct TestDir {
    pub dir: TempDir,
}

impl TestDir {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside this directory.
    #[must_use]
    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        write_file(self.path(), name, content)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `content` to `dir/name`.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap_or_else(|e| panic!("Failed to write {path:?}: {e}"));
    path
}
