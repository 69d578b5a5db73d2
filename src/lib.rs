//! Client for an image background-removal service, with brightness/contrast
//! adjustment and backdrop compositing for export.
//!
//! A file is uploaded unmodified to a `POST /remove-bg/` service, which returns
//! a PNG with the background made transparent. The result is previewed with
//! non-destructive brightness/contrast, then flattened against a chosen
//! backdrop at its natural size and exported as PNG.
//!
//! # Quick Start
//!
//! ```no_run
//! use bg_cutout::{RemoveBgClient, ServiceConfig, Session, SourceImage};
//!
//! let client = RemoveBgClient::new(ServiceConfig::default()).expect("bad service URL");
//! let mut session = Session::new();
//! let source = SourceImage::from_path("photo.jpg".as_ref()).unwrap();
//! session.process(&client, source).unwrap();
//!
//! session.set_brightness(120);
//! session.set_contrast(90);
//! session.select_swatch("red").unwrap();
//! session.save_export(".".as_ref()).unwrap();
//! ```
//!
//! # Compositing
//!
//! The compositor can also be used directly on an image that already has its
//! background removed.
//!
//! ```no_run
//! use bg_cutout::{composite, AdjustmentState, BackgroundChoice, ProcessedImage};
//!
//! let cutout = ProcessedImage::from(image::open("cutout.png").unwrap().to_rgba8());
//! let adj = AdjustmentState::new(110, 100).unwrap();
//! let flat = composite(&cutout, "#ffffff".parse().unwrap(), adj).unwrap();
//! flat.save("flat.png").unwrap();
//! # let _ = BackgroundChoice::Transparent;
//! ```

#![deny(missing_docs)]

pub mod adjust;
pub mod background;
pub mod client;
pub mod compositor;
pub mod config;
mod engine;
pub mod error;
pub mod media;
pub mod preview;
pub mod session;

pub use adjust::AdjustmentState;
pub use background::{BackgroundChoice, Swatch, SWATCHES};
pub use client::{BackgroundRemover, Passthrough, RemoveBgClient};
pub use compositor::{
    composite, crop_to_subject, encode_data_url, encode_png, save_png, EXPORT_FILE_NAME,
};
pub use config::{ProcessOptions, ServiceConfig};
pub use engine::{default_output_path, CutoutEngine, ProcessResult};
pub use error::{Error, Result};
pub use media::{is_supported_image, ProcessedImage, SourceImage};
pub use session::{Phase, Session, StatusBadge};
