// shelfscan-core/tests/object_locator_tests.rs

mod common;

use common::{BrightSpotDetector, FixedDetector, write_test_image};
use image::GenericImageView;
use shelfscan_core::CoreError;
use shelfscan_core::processing::{BoundingBox, Detection, ObjectLocator};
use tempfile::tempdir;

fn detection(x1: i32, y1: i32, x2: i32, y2: i32, confidence: f32) -> Detection {
    Detection {
        bbox: BoundingBox::new(x1, y1, x2, y2),
        confidence,
    }
}

#[test]
fn test_zero_detections_creates_empty_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let frame = dir.path().join("frame_0000.jpg");
    write_test_image(&frame, 32, 32);
    let objects_dir = dir.path().join("objects");

    let locator = ObjectLocator::with_threshold(FixedDetector::new(Vec::new()), 0.5);
    let objects = locator.crop_objects(&frame, &objects_dir)?;

    assert!(objects.is_empty());
    assert!(objects_dir.is_dir());
    assert_eq!(std::fs::read_dir(&objects_dir)?.count(), 0);
    Ok(())
}

#[test]
fn test_crops_each_detection_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let frame = dir.path().join("frame_0000.jpg");
    write_test_image(&frame, 100, 80);
    let objects_dir = dir.path().join("objects");

    let detector = FixedDetector::new(vec![
        detection(0, 0, 10, 20, 0.9),
        detection(50, 40, 90, 60, 0.8),
        // Extends past the image and is clamped
        detection(70, 70, 200, 200, 0.7),
    ]);
    let locator = ObjectLocator::with_threshold(detector, 0.5);

    let objects = locator.crop_objects(&frame, &objects_dir)?;

    let names: Vec<String> = objects
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["object_0000.jpg", "object_0001.jpg", "object_0002.jpg"]);

    let sizes: Vec<(u32, u32)> = objects
        .iter()
        .map(|p| image::open(p).map(|img| img.dimensions()))
        .collect::<Result<_, _>>()?;
    assert_eq!(sizes, [(10, 20), (40, 20), (30, 10)]);
    Ok(())
}

#[test]
fn test_threshold_is_passed_to_detector() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let frame = dir.path().join("frame_0000.jpg");
    write_test_image(&frame, 40, 40);

    let detector = FixedDetector::new(vec![
        detection(0, 0, 10, 10, 0.30),
        detection(10, 10, 20, 20, 0.55),
        detection(20, 20, 30, 30, 0.95),
    ]);
    let locator = ObjectLocator::with_threshold(detector, 0.55);
    assert_eq!(locator.confidence_threshold(), 0.55);

    let found = locator.detect_objects(&frame)?;
    let confidences: Vec<f32> = found.iter().map(|d| d.confidence).collect();
    assert_eq!(confidences, [0.55, 0.95]);
    Ok(())
}

#[test]
fn test_bright_spot_is_located() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let frame = dir.path().join("frame_0000.png");
    let mut image = image::RgbImage::new(50, 50);
    for y in 10..20 {
        for x in 30..45 {
            image.put_pixel(x, y, image::Rgb([255, 255, 255]));
        }
    }
    image.save(&frame)?;

    let locator = ObjectLocator::with_threshold(BrightSpotDetector { confidence: 0.9 }, 0.5);
    let found = locator.detect_objects(&frame)?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].bbox, BoundingBox::new(30, 10, 45, 20));
    Ok(())
}

#[test]
fn test_unreadable_image_is_input_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let bogus = dir.path().join("frame_0000.jpg");
    std::fs::write(&bogus, b"definitely not a jpeg")?;
    let objects_dir = dir.path().join("objects");

    let locator = ObjectLocator::with_threshold(FixedDetector::new(Vec::new()), 0.5);

    let result = locator.crop_objects(&bogus, &objects_dir);
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    assert!(!objects_dir.exists());

    let missing = locator.detect_objects(&dir.path().join("nope.jpg"));
    assert!(matches!(missing, Err(CoreError::InvalidInput(_))));
    Ok(())
}
