use super::*;
use crate::config::CaptionStyle;
use crate::effects::catalog::{Effect, EffectCatalog};
use crate::encode::sink::InMemorySink;
use crate::schedule::scheduler::{Placement, schedule};

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 36,
};

fn white_base(canvas: Canvas) -> FrameRGBA {
    FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data: vec![255; canvas.rgba_len()],
        premultiplied: true,
    }
}

fn plan(title: &str, duration_secs: f64, placements: Vec<Placement>) -> RenderPlan {
    let style = CaptionStyle {
        font_size: 20.0,
        ..CaptionStyle::default()
    };
    RenderPlan {
        canvas: CANVAS,
        fps: Fps::new(4, 1).unwrap(),
        base: white_base(CANVAS),
        caption: Caption::new(title, &style, CANVAS).unwrap(),
        timeline: Timeline::new(duration_secs, placements).unwrap(),
        audio: None,
    }
}

fn system_has_fonts() -> bool {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    !db.is_empty()
}

#[test]
fn frame_count_rounds_up() {
    assert_eq!(plan("", 2.5, Vec::new()).frame_count(), 10);
    assert_eq!(plan("", 2.6, Vec::new()).frame_count(), 11);
}

#[test]
fn audio_shorter_than_one_animation_renders_base_only() {
    let placements = schedule(3.0, &EffectCatalog::standard(), 5.0, 60.0).unwrap();
    assert!(placements.is_empty());
    let plan = plan("Title", 3.0, placements);

    let mut sink = InMemorySink::new();
    let stats = render_plan(&plan, &mut sink).unwrap();
    assert_eq!(stats.frames_total, 12);
    assert_eq!(stats.frames_captioned, 0);
    assert_eq!(stats.caption_rasters, 0);
    assert!(sink.ended());
    assert_eq!(sink.frames().len(), 12);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!(frame, &plan.base);
    }
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (64, 36));
}

#[test]
fn caption_only_inside_placement_windows() {
    if !system_has_fonts() {
        eprintln!("skipping: no system fonts available");
        return;
    }
    let placements = vec![Placement {
        effect: Effect::Opacity,
        start_secs: 0.0,
        duration_secs: 1.0,
    }];
    let plan = plan("HI", 2.0, placements);

    let mut sink = InMemorySink::new();
    let stats = render_plan(&plan, &mut sink).unwrap();
    assert_eq!(stats.frames_total, 8);
    // t = 0.75 is the opacity trough.
    assert_eq!(stats.frames_captioned, 3);
    assert_eq!(stats.caption_rasters, 1);

    let frames = sink.frames();
    for f in [0usize, 1, 2] {
        assert_ne!(frames[f].1, plan.base, "frame {f} should carry the caption");
    }
    for f in 3..8 {
        assert_eq!(frames[f].1, plan.base, "frame {f} should be the bare image");
    }
}

#[test]
fn mismatched_base_is_rejected_before_begin() {
    let mut bad = plan("", 1.0, Vec::new());
    bad.base = white_base(Canvas {
        width: 32,
        height: 36,
    });
    let mut sink = InMemorySink::new();
    assert!(matches!(
        render_plan(&bad, &mut sink),
        Err(StillcastError::InvalidConfiguration(_))
    ));
    assert!(sink.config().is_none());
}

#[derive(Default)]
struct FailingSink {
    pushed: u64,
    ended: bool,
    aborted: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> StillcastResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> StillcastResult<()> {
        if idx.0 == 3 {
            return Err(StillcastError::encoding("pipe closed"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> StillcastResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn sink_failure_aborts_instead_of_ending() {
    let plan = plan("", 2.0, Vec::new());
    let mut sink = FailingSink::default();
    let err = render_plan(&plan, &mut sink).unwrap_err();
    assert!(matches!(err, StillcastError::EncodingFailed(_)));
    assert_eq!(sink.pushed, 3);
    assert!(sink.aborted);
    assert!(!sink.ended);
}
