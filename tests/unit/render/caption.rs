use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 320,
        height: 180,
    }
}

fn system_has_fonts() -> bool {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    !db.is_empty()
}

fn opaque_pixels(rgba: &[u8]) -> usize {
    rgba.chunks_exact(4).filter(|p| p[3] > 0).count()
}

#[test]
fn centered_single_line_layout() {
    let style = CaptionStyle::default();
    let layout = CaptionLayout::compute("Hello", &style, canvas());
    assert_eq!(layout.lines, vec!["Hello".to_string()]);
    assert_eq!(layout.x, 160.0);
    assert_eq!(layout.text_anchor, "middle");
    // Block is one em tall, centered vertically.
    assert_eq!(layout.anchor, (160.0, 90.0));
    assert!((layout.baselines[0] - (55.0 + 56.0)).abs() < 1e-4);
}

#[test]
fn multi_line_top_left_layout() {
    let style = CaptionStyle {
        font_size: 20.0,
        align: HAlign::Left,
        vertical: VAlign::Top,
        margin: 10.0,
        ..CaptionStyle::default()
    };
    let layout = CaptionLayout::compute("one\ntwo\nthree", &style, canvas());
    assert_eq!(layout.lines.len(), 3);
    assert_eq!(layout.x, 10.0);
    assert_eq!(layout.text_anchor, "start");
    assert!((layout.baselines[0] - 26.0).abs() < 1e-4);
    assert!((layout.baselines[1] - 50.0).abs() < 1e-4);
    assert!((layout.baselines[2] - 74.0).abs() < 1e-4);
}

#[test]
fn bottom_right_layout_respects_margin() {
    let style = CaptionStyle {
        font_size: 20.0,
        align: HAlign::Right,
        vertical: VAlign::Bottom,
        margin: 10.0,
        ..CaptionStyle::default()
    };
    let layout = CaptionLayout::compute("x", &style, canvas());
    assert_eq!(layout.x, 310.0);
    assert_eq!(layout.text_anchor, "end");
    assert_eq!(layout.anchor.1, 180.0 - 10.0 - 10.0);
}

#[test]
fn svg_escapes_title_and_style() {
    let style = CaptionStyle {
        color: "#000".to_string(),
        ..CaptionStyle::default()
    };
    let layout = CaptionLayout::compute("Tom & \"Jerry\" <3", &style, canvas());
    let svg = layout.to_svg(&style, canvas());
    assert!(svg.contains("Tom &amp; &quot;Jerry&quot; &lt;3"));
    assert!(svg.contains(r#"font-family="Times New Roman, serif""#));
    assert!(svg.contains(r##"fill="#000""##));
}

#[test]
fn blank_title_rasterizes_transparent() {
    let caption = Caption::new("   ", &CaptionStyle::default(), canvas()).unwrap();
    assert!(!caption.has_text());
    let raster = caption.rasterize(&OverlayState::IDENTITY).unwrap();
    assert_eq!(raster.len(), canvas().rgba_len());
    assert_eq!(opaque_pixels(&raster), 0);
}

#[test]
fn odd_canvas_is_rejected() {
    let bad = Canvas {
        width: 321,
        height: 180,
    };
    assert!(Caption::new("x", &CaptionStyle::default(), bad).is_err());
}

#[test]
fn scale_grows_the_rendered_caption() {
    if !system_has_fonts() {
        eprintln!("skipping: no system fonts available");
        return;
    }
    let style = CaptionStyle {
        font_size: 40.0,
        ..CaptionStyle::default()
    };
    let caption = Caption::new("WAVE", &style, canvas()).unwrap();
    let small = caption
        .rasterize(&OverlayState {
            scale: 0.8,
            ..OverlayState::IDENTITY
        })
        .unwrap();
    let large = caption
        .rasterize(&OverlayState {
            scale: 1.2,
            ..OverlayState::IDENTITY
        })
        .unwrap();
    assert!(opaque_pixels(&small) > 0);
    assert!(opaque_pixels(&large) > opaque_pixels(&small));
}

#[test]
fn unknown_family_still_renders_with_some_face() {
    if !system_has_fonts() {
        eprintln!("skipping: no system fonts available");
        return;
    }
    let style = CaptionStyle {
        font_family: "Definitely Not Installed 9000".to_string(),
        font_size: 40.0,
        ..CaptionStyle::default()
    };
    let caption = Caption::new("ABC", &style, canvas()).unwrap();
    let raster = caption.rasterize(&OverlayState::IDENTITY).unwrap();
    assert!(opaque_pixels(&raster) > 0);
}

#[test]
fn generic_families_map_one_to_one() {
    use usvg::fontdb::Family;

    assert_eq!(fontdb_family(&usvg::FontFamily::Serif), Family::Serif);
    assert_eq!(fontdb_family(&usvg::FontFamily::Monospace), Family::Monospace);
    let named = usvg::FontFamily::Named("Georgia".to_string());
    assert_eq!(fontdb_family(&named), Family::Name("Georgia"));
}

#[test]
fn offset_moves_caption_down() {
    if !system_has_fonts() {
        eprintln!("skipping: no system fonts available");
        return;
    }
    let caption = Caption::new("DRIFT", &CaptionStyle::default(), canvas()).unwrap();
    let first_row = |rgba: &[u8]| {
        rgba.chunks_exact(canvas().width as usize * 4)
            .position(|row| row.chunks_exact(4).any(|p| p[3] > 0))
    };
    let base = caption.rasterize(&OverlayState::IDENTITY).unwrap();
    let moved = caption
        .rasterize(&OverlayState {
            offset_y: 30.0,
            ..OverlayState::IDENTITY
        })
        .unwrap();
    let (a, b) = (first_row(&base).unwrap(), first_row(&moved).unwrap());
    assert!(b >= a + 25, "expected ~30px shift, got {a} -> {b}");
}
