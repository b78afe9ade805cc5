use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use tessera_error::TesseraErrorKind;
use tessera_interface::{ComposeParams, ImageBackend};
use tessera_models::LocalCompositor;

fn png(image: RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

/// A `width`x`height` transparent image with an opaque red block.
fn with_block(width: u32, height: u32, x: u32, y: u32, w: u32, h: u32) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    for px in x..x + w {
        for py in y..y + h {
            image.put_pixel(px, py, Rgba([255, 0, 0, 255]));
        }
    }
    image
}

fn params(aspect_ratio: &str) -> ComposeParams {
    ComposeParams::builder().aspect_ratio(aspect_ratio).build().unwrap()
}

#[tokio::test]
async fn test_trim_crops_to_opaque_pixels() {
    let source = png(with_block(40, 30, 5, 7, 10, 4));

    let trimmed = decode(&LocalCompositor::new().trim(&source).await.unwrap());

    assert_eq!(trimmed.dimensions(), (10, 4));
    assert!(trimmed.pixels().all(|p| p[3] == 255));
}

#[tokio::test]
async fn test_trim_keeps_faint_edges() {
    let mut image = with_block(20, 20, 8, 8, 2, 2);
    image.put_pixel(1, 2, Rgba([0, 0, 0, 1]));

    let trimmed = decode(&LocalCompositor::new().trim(&png(image)).await.unwrap());

    assert_eq!(trimmed.dimensions(), (9, 8));
}

#[tokio::test]
async fn test_trim_leaves_fully_transparent_image_unchanged() {
    let source = png(RgbaImage::new(12, 12));
    let trimmed = LocalCompositor::new().trim(&source).await.unwrap();
    assert_eq!(trimmed, source);
}

#[tokio::test]
async fn test_trim_rejects_undecodable_bytes() {
    let err = LocalCompositor::new().trim(b"not an image").await.unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Upstream(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_compose_fits_single_image_on_aspect_canvas() {
    let compositor = LocalCompositor::new().with_long_edge(160);
    let source = png(with_block(50, 50, 0, 0, 50, 50));

    let composed = decode(&compositor.compose(&[source], &params("16:9")).await.unwrap());

    assert_eq!(composed.dimensions(), (160, 90));
    // centered, with transparent margins
    assert!(composed.get_pixel(80, 45)[3] > 200);
    assert_eq!(composed.get_pixel(0, 0)[3], 0);
}

#[tokio::test]
async fn test_compose_places_sources_on_grid_in_order() {
    let compositor = LocalCompositor::new().with_long_edge(200);
    let red = png(with_block(10, 10, 0, 0, 10, 10));
    let mut blue = RgbaImage::new(10, 10);
    for pixel in blue.pixels_mut() {
        *pixel = Rgba([0, 0, 255, 255]);
    }
    let blue = png(blue);

    let composed = decode(
        &compositor
            .compose(&[red, blue], &params("2:1"))
            .await
            .unwrap(),
    );

    assert_eq!(composed.dimensions(), (200, 100));
    // two columns: red on the left, blue on the right
    let left = composed.get_pixel(50, 50);
    let right = composed.get_pixel(150, 50);
    assert!(left[0] > 200 && left[2] < 50);
    assert!(right[2] > 200 && right[0] < 50);
}

#[tokio::test]
async fn test_compose_then_trim_drops_canvas_padding() {
    let compositor = LocalCompositor::new().with_long_edge(120);
    let source = png(with_block(30, 30, 0, 0, 30, 30));

    let composed = compositor.compose(&[source], &params("1:1")).await.unwrap();
    let trimmed = decode(&compositor.trim(&composed).await.unwrap());

    // fitted to the cell inside its margins, then trimmed back to content
    assert_eq!(trimmed.dimensions(), (72, 72));
}

#[tokio::test]
async fn test_compose_rejects_bad_input() {
    let compositor = LocalCompositor::new();
    let source = png(with_block(4, 4, 0, 0, 4, 4));

    let err = compositor.compose(&[], &params("1:1")).await.unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));

    for ratio in ["wide", "16:0", "16x9", ":9"] {
        let err = compositor
            .compose(&[source.clone()], &params(ratio))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), TesseraErrorKind::Config(_)), "{ratio}");
    }
}

#[test]
fn test_canvas_size_keeps_long_edge() {
    let compositor = LocalCompositor::new();
    assert_eq!(compositor.canvas_size("1:1").unwrap(), (1536, 1536));
    assert_eq!(compositor.canvas_size("16:9").unwrap(), (1536, 864));
    assert_eq!(compositor.canvas_size("4:5").unwrap(), (1229, 1536));
}
