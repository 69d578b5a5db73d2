//! Flatten an already cut-out PNG against a backdrop.
//!
//! Usage:
//! ```sh
//! cargo run --example composite_cutout -- cutout.png out.png "#ff0000" 120 90
//! ```

use std::env;
use std::process;

use bg_cutout::{composite, save_png, AdjustmentState, BackgroundChoice, ProcessedImage};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output> [background] [brightness] [contrast]", args[0]);
        process::exit(1);
    }

    let background: BackgroundChoice = args
        .get(3)
        .map_or(Ok(BackgroundChoice::Transparent), |s| s.parse())
        .expect("invalid background");
    let brightness: u16 = args.get(4).map_or(100, |s| s.parse().expect("invalid brightness"));
    let contrast: u16 = args.get(5).map_or(100, |s| s.parse().expect("invalid contrast"));
    let adjustments = AdjustmentState::new(brightness, contrast).expect("adjustment out of range");

    let cutout = ProcessedImage::from(
        image::open(&args[1])
            .expect("failed to open input")
            .to_rgba8(),
    );

    match composite(&cutout, background, adjustments).and_then(|img| save_png(&img, args[2].as_ref())) {
        Ok(()) => println!("Done: {}", args[2]),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
