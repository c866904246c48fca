use pixelwrap::{FontId, FontMetrics, FontMetricsStore, StyledNode, Template};

pub const WORDS: &[&str] = &[
    "alpha", "be", "gamma", "delta", "epsilon", "z", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "supercalifragilistic", "omicron", "pi",
];

/// Every glyph 5 px wide (6 px with letter spacing).
pub fn uniform_store() -> FontMetricsStore {
    FontMetricsStore::builder()
        .default_width(5.0)
        .font(FontId::default_font(), FontMetrics::new())
        .build()
}

/// Uniform 5 px glyphs with narrow punctuation and a reference chain to an
/// accent font.
pub fn narrow_store() -> FontMetricsStore {
    FontMetricsStore::builder()
        .default_width(5.0)
        .font(
            FontId::default_font(),
            FontMetrics::new()
                .with_uniform_width("il.,'!", 1.0)
                .with_width(' ', 3.0)
                .with_reference(FontId::parse("accents")),
        )
        .font(
            FontId::parse("accents"),
            FontMetrics::new().with_uniform_width("éàü", 4.0),
        )
        .build()
}

/// `count` words separated by spaces as one text run.
pub fn paragraph(count: usize) -> StyledNode {
    let text = (0..count)
        .map(|idx| WORDS[idx % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ");
    StyledNode::text(text)
}

/// Mixed tree: styled runs, sprites, server nodes, templates and newlines.
pub fn mixed_tree(count: usize) -> StyledNode {
    let mut root = StyledNode::empty();
    for idx in 0..count {
        let word = WORDS[idx % WORDS.len()];
        let node = match idx % 9 {
            2 => StyledNode::text(format!("{word} ")).bold(true),
            4 => StyledNode::sprite("coin").append(StyledNode::text(" ")),
            5 => StyledNode::score("@s", "coins"),
            6 => StyledNode::template(
                Template::new("msg", "[%s] ").with_argument(StyledNode::text(word)),
            ),
            8 => StyledNode::text(format!("{word}\n")),
            _ => StyledNode::text(format!("{word} ")),
        };
        root.children.push(node);
    }
    root
}
