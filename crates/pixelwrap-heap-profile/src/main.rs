//! DHAT heap profiler for pixelwrap.
//!
//! Profiles allocation patterns of the wrapping pipeline over synthetic styled
//! trees: measure -> segment -> layout.
//!
//! Usage:
//!   cargo run -p pixelwrap-heap-profile --release -- [OPTIONS]
//!
//! Outputs dhat-<phase>.json in the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::{Path, PathBuf};

use pixelwrap::{Diagnostics, FontId, FontMetrics, FontMetricsStore, StyledNode, Template};
use pixelwrap_layout::{Alignment, LayoutContext};

const DEFAULT_WIDTH: f64 = 150.0;
const DEFAULT_WORDS: usize = 400;
const DEFAULT_ITERATIONS: usize = 50;

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "while", "seven",
    "wizards", "quietly", "hex", "jovial", "kings", "incomprehensibilities",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Measure,
    Segment,
    Layout,
    Full,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "measure" => Some(Self::Measure),
            "segment" => Some(Self::Segment),
            "layout" => Some(Self::Layout),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Measure => "measure",
            Self::Segment => "segment",
            Self::Layout => "layout",
            Self::Full => "full",
        }
    }
}

/// Printable ASCII at 5 px with a few narrow glyphs, plus a fallback font
/// reached through a reference.
fn synthetic_store() -> FontMetricsStore {
    let mut default_font = FontMetrics::new().with_reference(FontId::parse("pixelwrap:fallback"));
    for ch in (0x21u8..0x7f).map(char::from) {
        default_font = default_font.with_width(ch, 5.0);
    }
    default_font = default_font
        .with_uniform_width("il.,:;'|!", 1.0)
        .with_width(' ', 3.0);
    FontMetricsStore::builder()
        .default_width(5.0)
        .font(FontId::default_font(), default_font)
        .font(
            FontId::parse("pixelwrap:fallback"),
            FontMetrics::new().with_uniform_width("éèàüö", 5.0),
        )
        .build()
}

fn load_store(path: &Path) -> FontMetricsStore {
    let bytes = std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("Failed to read metrics {}: {}", path.display(), e);
        std::process::exit(1);
    });
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        eprintln!("Failed to parse metrics {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn synthetic_tree(words: usize) -> StyledNode {
    let mut root = StyledNode::empty();
    for idx in 0..words {
        let word = WORDS[idx % WORDS.len()];
        let node = match idx % 11 {
            3 => StyledNode::text(format!("{word} ")).bold(true),
            7 => StyledNode::sprite("heart").append(StyledNode::text(" ")),
            9 => StyledNode::template(
                Template::new("chat.type.text", "<%s> %s ")
                    .with_argument(StyledNode::text("Steve"))
                    .with_argument(StyledNode::text(word)),
            ),
            10 => StyledNode::text(format!("{word}\n")),
            _ => StyledNode::text(format!("{word} ")),
        };
        root.children.push(node);
    }
    root
}

fn profile_phase(ctx: &LayoutContext, tree: &StyledNode, width: f64, phase: Phase, iterations: usize) {
    for _ in 0..iterations {
        match phase {
            Phase::Measure => {
                let _ = ctx.measure(tree);
            }
            Phase::Segment => {
                let _ = ctx.segment(tree, width);
            }
            Phase::Layout => {
                let _ = ctx
                    .layout(tree)
                    .width(width)
                    .align(Alignment::Center)
                    .fill_lines(true)
                    .build()
                    .unwrap_or_else(|e| panic!("layout: {}", e));
            }
            Phase::Full => {
                let _ = ctx.measure(tree);
                let result = ctx.segment(tree, width);
                let _ = result.joined();
                let _ = ctx
                    .layout(tree)
                    .width(width)
                    .uniform_padding(4.0)
                    .build()
                    .unwrap_or_else(|e| panic!("layout: {}", e));
            }
        }
    }
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --phase <measure|segment|layout|full>  Phase to profile (default: segment)");
    eprintln!("  --out-dir <DIR>                        Output directory (default: target/memory)");
    eprintln!("  --metrics <FILE>                       Font metrics JSON (default: synthetic)");
    eprintln!("  --width <PX>                           Layout width (default: 150)");
    eprintln!("  --words <N>                            Words in the synthetic tree (default: 400)");
    eprintln!("  --iterations <N>                       Passes per profile (default: 50)");
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    value
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("Invalid value for {flag}");
            usage();
            std::process::exit(1);
        })
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Segment;
    let mut out_dir = PathBuf::from("target/memory");
    let mut metrics: Option<PathBuf> = None;
    let mut width = DEFAULT_WIDTH;
    let mut words = DEFAULT_WORDS;
    let mut iterations = DEFAULT_ITERATIONS;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" => {
                i += 1;
                let value = args.get(i).map(String::as_str).unwrap_or("");
                phase = Phase::from_str(value).unwrap_or_else(|| {
                    eprintln!("Unknown phase: {}", value);
                    usage();
                    std::process::exit(1);
                });
            }
            "--out-dir" => {
                i += 1;
                out_dir = PathBuf::from(args.get(i).map(String::as_str).unwrap_or("."));
            }
            "--metrics" => {
                i += 1;
                metrics = args.get(i).map(PathBuf::from);
            }
            "--width" => {
                i += 1;
                width = parse_number("--width", args.get(i));
            }
            "--words" => {
                i += 1;
                words = parse_number("--words", args.get(i));
            }
            "--iterations" => {
                i += 1;
                iterations = parse_number("--iterations", args.get(i));
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    // Built before profiling starts so setup allocations stay out of the report.
    let store = match &metrics {
        Some(path) => load_store(path),
        None => synthetic_store(),
    };
    let ctx = LayoutContext::builder(store)
        .diagnostics(Diagnostics::silent())
        .build();
    let tree = synthetic_tree(words);

    let phase_name = phase.name();
    let json_path = out_dir.join(format!("dhat-{phase_name}.json"));
    eprintln!(
        "heap-profile: phase={}, words={}, width={}, iterations={}, out={}",
        phase_name,
        words,
        width,
        iterations,
        out_dir.display()
    );

    let _profiler = dhat::Profiler::builder()
        .file_name(json_path.clone())
        .build();

    profile_phase(&ctx, &tree, width, phase, iterations);

    // _profiler drops here, writes JSON
    eprintln!(
        "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
        json_path.display()
    );
}
