use std::sync::{Arc, Mutex};

use pixelwrap::{
    DiagnosticConfig, DiagnosticKind, Diagnostics, FontId, FontMetrics, FontMetricsStore,
    LayoutDiagnostic, NodeContent, StyledNode, Template, WidthLookup,
};
use pixelwrap_layout::{
    compose_lines, Alignment, LayoutContext, LayoutOptions, PreciseSpacer,
};

fn uniform_context() -> LayoutContext {
    let store = FontMetricsStore::builder()
        .default_width(5.0)
        .font(FontId::default_font(), FontMetrics::new())
        .build();
    LayoutContext::builder(store)
        .diagnostics(Diagnostics::silent())
        .build()
}

fn spacer_widths(node: &StyledNode) -> Vec<f64> {
    node.children
        .iter()
        .filter_map(|child| match &child.content {
            NodeContent::Atomic(pixelwrap::AtomicKind::Spacer(width)) => Some(*width),
            _ => None,
        })
        .collect()
}

#[test]
fn hello_world_wraps_at_forty_pixels() {
    let ctx = uniform_context();
    let result = ctx.segment(&StyledNode::text("Hello World"), 40.0);
    let lines: Vec<_> = result
        .lines()
        .iter()
        .map(|line| (line.plain_text(), line.width()))
        .collect();
    assert_eq!(
        lines,
        vec![("Hello".to_string(), 30.0), ("World".to_string(), 30.0)]
    );
}

#[test]
fn centered_forty_pixel_line_gets_thirty_pixel_spacer() {
    let ctx = uniform_context();
    let result = ctx.segment(&StyledNode::text("abcd").append(StyledNode::spacer(16.0)), 100.0);
    assert_eq!(result.lines()[0].width(), 40.0);

    let options = LayoutOptions {
        width: 100.0,
        alignment: Alignment::Center,
        ..LayoutOptions::default()
    };
    let out = compose_lines(&result, &options, &PreciseSpacer).expect("layout");
    assert_eq!(spacer_widths(&out), vec![30.0]);
    assert_eq!(out.children.len(), 2);
}

#[test]
fn bold_glyph_and_reference_chain_examples() {
    let store = FontMetricsStore::builder()
        .default_width(5.0)
        .font(FontId::parse("a"), FontMetrics::new().with_reference(FontId::parse("b")))
        .font(FontId::parse("b"), FontMetrics::new().with_width('x', 7.0))
        .build();
    assert_eq!(store.resolve(&FontId::parse("a"), 'x'), WidthLookup::Found(7.0));

    let ctx = LayoutContext::builder(store)
        .diagnostics(Diagnostics::silent())
        .build();
    assert_eq!(ctx.measure(&StyledNode::text("A").bold(true)), 7.0);
}

#[test]
fn alignments_remeasure_to_expected_extents() {
    let ctx = uniform_context();
    let node = StyledNode::text("Hi there");
    let w = ctx.measure(&node);

    let centered = ctx
        .layout(&node)
        .width(100.0)
        .align(Alignment::Center)
        .build()
        .expect("center");
    assert_eq!(ctx.measure(&centered), 50.0 + w / 2.0);

    let right = ctx.align_right(&node, 100.0, 0.0).expect("right");
    assert_eq!(ctx.measure(&right), 100.0);

    let filled = ctx
        .layout(&node)
        .width(100.0)
        .align(Alignment::Center)
        .fill_lines(true)
        .build()
        .expect("fill");
    assert_eq!(ctx.measure(&filled), 100.0);

    let left = ctx.align_left(&node, 100.0, 10.0).expect("left");
    assert_eq!(spacer_widths(&left), vec![10.0]);
    assert_eq!(ctx.measure(&left), 10.0 + w);
}

#[test]
fn padding_shrinks_wrap_width() {
    let ctx = uniform_context();
    let out = ctx
        .layout(&StyledNode::text("aaaa bbbb"))
        .width(50.0)
        .padding(10.0, 10.0)
        .fill_lines(true)
        .build()
        .expect("layout");
    // 30 px of content: one word per line, each line filled to 50 px.
    assert_eq!(out.plain_text(), "aaaa\nbbbb");
    assert_eq!(spacer_widths(&out), vec![10.0, 16.0, 10.0, 16.0]);
}

#[test]
fn negative_padding_shifts_line_left() {
    let ctx = uniform_context();
    let out = ctx
        .layout(&StyledNode::text("ab"))
        .width(100.0)
        .padding(-10.0, 0.0)
        .build()
        .expect("negative padding leaves 110 px of content");
    assert_eq!(spacer_widths(&out), vec![-10.0]);
    assert_eq!(out.plain_text(), "ab");
}

#[test]
fn leading_indentation_survives_layout() {
    let ctx = uniform_context();
    let out = ctx
        .layout(&StyledNode::text("a\n  b"))
        .width(100.0)
        .build()
        .expect("layout");
    assert_eq!(out.plain_text(), "a\n  b");
}

#[test]
fn every_line_fits_except_forced_overflow() {
    let ctx = uniform_context();
    let tree = StyledNode::text("lorem ipsum dolor sit amet, ")
        .append(StyledNode::text("consectetur").bold(true))
        .append(StyledNode::sprite("star"))
        .append(StyledNode::text(" adipiscing elit sed do eiusmod tempor"));
    for max_width in [20.0, 33.0, 47.0, 64.0, 100.0] {
        let result = ctx.segment(&tree, max_width);
        for line in result.lines() {
            assert!(
                line.width() <= max_width,
                "line {:?} is {}px at max {}",
                line.plain_text(),
                line.width(),
                max_width
            );
            assert!(!line.plain_text().starts_with(' '));
        }
        let text = result.joined().plain_text();
        assert_eq!(
            text.split_whitespace().collect::<String>(),
            tree.plain_text().split_whitespace().collect::<String>()
        );
    }
}

#[test]
fn cyclic_fonts_terminate_during_layout() {
    let store = FontMetricsStore::builder()
        .default_width(6.0)
        .font(FontId::parse("a"), FontMetrics::new().with_reference(FontId::parse("b")))
        .font(FontId::parse("b"), FontMetrics::new().with_reference(FontId::parse("a")))
        .build();
    let ctx = LayoutContext::builder(store)
        .diagnostics(Diagnostics::silent())
        .build();
    let node = StyledNode::text("loop").font(FontId::parse("a"));
    assert_eq!(ctx.measure(&node), 28.0);
    assert_eq!(ctx.segment(&node, 14.0).len(), 2);
}

#[test]
fn content_width_must_stay_positive() {
    let ctx = uniform_context();
    let err = ctx
        .layout(&StyledNode::text("x"))
        .width(20.0)
        .uniform_padding(10.0)
        .build()
        .expect_err("no room for content");
    assert_eq!(err.code, "CONTENT_WIDTH_NON_POSITIVE");
    assert!(err.to_string().contains("width=20"));
}

#[test]
fn unresolved_nodes_are_reported_but_laid_out() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let diagnostics = Diagnostics::new(DiagnosticConfig::default())
        .with_logging(false)
        .with_sink(Arc::new(move |d: &LayoutDiagnostic| {
            sink_seen.lock().expect("lock").push(d.kind());
        }));
    let store = FontMetricsStore::builder().default_width(5.0).build();
    let ctx = LayoutContext::builder(store).diagnostics(diagnostics).build();

    let tree = StyledNode::text("score: ")
        .append(StyledNode::score("@s", "points"))
        .append(StyledNode::template(
            Template::new("death.attack.generic", "%s died").with_argument(StyledNode::selector("@p")),
        ));
    let out = ctx.center(&tree, 120.0).expect("layout");
    assert_eq!(out.plain_text(), "score:  died");

    let kinds = seen.lock().expect("lock").clone();
    assert!(kinds.contains(&DiagnosticKind::UnresolvedServerNode));
    assert!(kinds.contains(&DiagnosticKind::UnforcedClientNode));
    assert!(kinds.contains(&DiagnosticKind::MissingFont));
}
