//! File and directory processing: load, remove background, composite, save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::client::BackgroundRemover;
use crate::compositor;
use crate::config::ProcessOptions;
use crate::error::Error;
use crate::media::{is_supported_image, ProcessedImage, SourceImage};
use crate::session::Session;

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Where the export was written, on success.
    pub output: Option<PathBuf>,
    /// Whether processing succeeded.
    pub success: bool,
    /// Dimensions of the exported image.
    pub dimensions: Option<(u32, u32)>,
    /// Share of the image covered by the subject, in percent.
    pub coverage: Option<f32>,
    /// Human-readable status message.
    pub message: String,
    /// Hint for service failures.
    pub hint: Option<&'static str>,
}

impl ProcessResult {
    fn failed(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            output: None,
            success: false,
            dimensions: None,
            coverage: None,
            message: error.to_string(),
            hint: error.hint(),
        }
    }
}

/// Drives files through a [`BackgroundRemover`] and the compositor.
///
/// Each file gets its own [`Session`], so files never share edits.
pub struct CutoutEngine<R> {
    remover: R,
}

impl<R: BackgroundRemover> CutoutEngine<R> {
    /// Create an engine around a remover.
    pub fn new(remover: R) -> Self {
        Self { remover }
    }

    /// Borrow the remover.
    pub fn remover(&self) -> &R {
        &self.remover
    }

    /// Process a single image file: upload, composite, save as PNG.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path, opts: &ProcessOptions) -> ProcessResult {
        let source = match SourceImage::from_path(input) {
            Ok(s) => s,
            Err(e) => return ProcessResult::failed(input, &e),
        };

        let mut session = Session::new();
        if let Err(e) = session.process(&self.remover, source) {
            return ProcessResult::failed(input, &e);
        }
        session.set_adjustments(opts.adjustments);
        session.select_background(opts.background);
        session.set_auto_crop(opts.crop);
        let coverage = session.processed().map(ProcessedImage::coverage);

        let flattened = match session.export() {
            Ok(img) => img,
            Err(e) => return ProcessResult::failed(input, &e),
        };

        if let Err(e) = compositor::save_png(&flattened, output) {
            return ProcessResult::failed(input, &e);
        }

        log::info!("{} -> {}", input.display(), output.display());
        ProcessResult {
            path: input.to_path_buf(),
            output: Some(output.to_path_buf()),
            success: true,
            dimensions: Some(flattened.dimensions()),
            coverage,
            message: "Background removed".to_string(),
            hint: None,
        }
    }

    /// Process all supported images in a directory.
    ///
    /// Outputs are named `{stem}.png` inside `output_dir`, or
    /// `{stem}.{ext}.png` when several inputs share a stem. Uses parallel
    /// iteration when the `cli` feature is enabled (via rayon).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult>
    where
        R: Sync,
    {
        let mut inputs: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => return vec![ProcessResult::failed(input_dir, &Error::Io(e))],
        };
        inputs.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult::failed(output_dir, &Error::Io(e))];
            }
        }

        let jobs: Vec<(PathBuf, PathBuf)> = inputs
            .iter()
            .cloned()
            .zip(batch_output_names(&inputs))
            .map(|(input, name)| (input, output_dir.join(name)))
            .collect();

        let run = |(input, output_path): &(PathBuf, PathBuf)| {
            self.process_file(input, output_path, opts)
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            jobs.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            jobs.iter().map(run).collect()
        }
    }
}

/// PNG file names for a batch, one per input, never repeating.
///
/// Inputs whose stem is unique keep `{stem}.png`; inputs sharing a stem
/// (`photo.png`, `photo.bmp`) keep their extension as `{stem}.{ext}.png`.
fn batch_output_names(inputs: &[PathBuf]) -> Vec<String> {
    let stem_of = |p: &PathBuf| p.file_stem().unwrap_or_default().to_string_lossy().into_owned();

    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for input in inputs {
        *stem_counts.entry(stem_of(input)).or_default() += 1;
    }

    inputs
        .iter()
        .map(|input| {
            let stem = stem_of(input);
            if stem_counts[&stem] > 1 {
                let ext = input.extension().unwrap_or_default().to_string_lossy();
                format!("{stem}.{ext}.png")
            } else {
                format!("{stem}.png")
            }
        })
        .collect()
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_cutout.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_cutout.png"))
}
