use bg_cutout::{
    AdjustmentState, BackgroundChoice, BackgroundRemover, Error, Phase, Result, Session,
    SourceImage,
};
use image::{ImageFormat, Rgba, RgbaImage};

/// Fake service: returns a fixed cut-out regardless of the upload.
struct CannedService {
    body: Vec<u8>,
}

impl BackgroundRemover for CannedService {
    fn remove_background(&self, source: &SourceImage) -> Result<Vec<u8>> {
        assert!(!source.bytes().is_empty());
        Ok(self.body.clone())
    }
}

fn encode(img: &RgbaImage) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// 800x600 with a fully transparent border and an opaque centre.
fn subject_800x600() -> RgbaImage {
    let mut img = RgbaImage::new(800, 600);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let inside = (200..600).contains(&x) && (150..450).contains(&y);
        *px = if inside {
            Rgba([100, 180, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        };
    }
    img
}

#[test]
fn end_to_end_red_backdrop_with_adjustments() {
    let service = CannedService {
        body: encode(&subject_800x600()),
    };
    let mut session = Session::new();
    session
        .process(&service, SourceImage::new("photo.jpg", vec![0xff, 0xd8]))
        .unwrap();
    assert_eq!(session.phase(), Phase::Ready);
    assert_eq!(session.badge().text, "Extraction Complete");

    session.select_background("#ff0000".parse().unwrap());
    session.set_brightness(120);
    session.set_contrast(90);

    let png = session.export_png().unwrap();
    let exported = image::load_from_memory(&png).unwrap().to_rgba8();

    assert_eq!(exported.dimensions(), (800, 600));
    assert!(exported.pixels().all(|p| p[3] == 255));
    assert_eq!(*exported.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*exported.get_pixel(799, 599), Rgba([255, 0, 0, 255]));

    let adj = AdjustmentState::new(120, 90).unwrap();
    let centre = exported.get_pixel(400, 300);
    assert_eq!(centre[0], adj.apply_channel(100));
    assert_eq!(centre[1], adj.apply_channel(180));
    assert_eq!(centre[2], adj.apply_channel(40));
    assert_eq!(centre[0], 121);
}

#[test]
fn transparent_export_preserves_alpha() {
    let service = CannedService {
        body: encode(&subject_800x600()),
    };
    let mut session = Session::new();
    session
        .process(&service, SourceImage::new("photo.png", vec![1]))
        .unwrap();
    session.select_background(BackgroundChoice::Transparent);

    let exported = session.export().unwrap();
    assert_eq!(exported, subject_800x600());
}

#[test]
fn new_upload_after_export_resets_edits() {
    let service = CannedService {
        body: encode(&RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))),
    };
    let mut session = Session::new();
    session
        .process(&service, SourceImage::new("a.png", vec![1]))
        .unwrap();
    session.set_brightness(40);
    session.select_swatch("black").unwrap();
    let _ = session.export_png().unwrap();

    session
        .process(&service, SourceImage::new("b.png", vec![2]))
        .unwrap();
    assert_eq!(session.adjustments(), AdjustmentState::default());
    assert_eq!(session.background(), BackgroundChoice::Transparent);
    assert_eq!(session.source().unwrap().file_name(), "b.png");
}

#[test]
fn garbage_from_service_is_a_service_failure() {
    let service = CannedService {
        body: b"502 Bad Gateway".to_vec(),
    };
    let mut session = Session::new();
    let err = session
        .process(&service, SourceImage::new("a.png", vec![1]))
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert!(err.hint().is_some());
    assert_eq!(session.phase(), Phase::Failed);
    assert!(matches!(session.export(), Err(Error::NoResult)));
}
