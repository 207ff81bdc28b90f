use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use tiny_skia::Pixmap;

use obidome::core::sparkline::{
    FillStyle, Scale, SparklineHistory, SparklineRenderer, SparklineSettings,
};

fn decode(uri: &str) -> Pixmap {
    let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
    let bytes = STANDARD.decode(payload).unwrap();
    Pixmap::decode_png(&bytes).unwrap()
}

#[test]
fn test_buffer_keeps_most_recent_values() {
    let mut history = SparklineHistory::new(10, Scale::Fixed { min: 0.0, max: 100.0 });
    for i in 0..15 {
        history.push(i as f64);
    }

    assert_eq!(history.len(), 10);
    let values: Vec<f64> = history.values().collect();
    assert_eq!(values, (5..15).map(|i| i as f64).collect::<Vec<_>>());
}

#[test]
fn test_auto_range_never_shrinks() {
    let mut history = SparklineHistory::new(2, Scale::Auto);
    history.push(10.0);
    history.push(90.0);
    history.push(5.0);

    // 10 has been evicted but the range still covers it and 90
    let (min, max) = history.range();
    assert!(min <= 5.0);
    assert!(max >= 90.0);
}

#[test]
fn test_renderer_output_is_a_png_data_uri() {
    let settings = SparklineSettings {
        width: 64,
        height: 24,
        fill_style: FillStyle::Gradient,
        ..Default::default()
    };
    let mut renderer = SparklineRenderer::new(&settings);

    let mut last = String::new();
    for value in [10.0, 50.0, 90.0, 30.0] {
        last = renderer.update_and_encode(value);
    }

    assert!(last.starts_with("data:image/png;base64,"));
    let image = decode(&last);
    assert_eq!((image.width(), image.height()), (64, 24));
    assert!(image.pixels().iter().any(|p| p.alpha() > 0));
}

#[test]
fn test_gradient_fades_towards_the_bottom() {
    let settings = SparklineSettings {
        width: 20,
        height: 40,
        buffer_len: 2,
        fill_style: FillStyle::Gradient,
        ..Default::default()
    };
    let mut renderer = SparklineRenderer::new(&settings);
    renderer.update_and_encode(100.0);
    let image = decode(&renderer.update_and_encode(100.0));

    let near_top = image.pixel(10, 6).unwrap().alpha();
    let near_bottom = image.pixel(10, 38).unwrap().alpha();
    assert!(near_top > near_bottom);
    assert!(near_bottom > 0);
}
