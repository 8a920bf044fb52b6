//! Shared helpers for richtext integration tests: stream snapshots, line
//! diffing, and chunked-render comparisons.

use richtext::{OutputItem, Renderer};

/// Render a whole document in one feed.
pub fn render(html: &str) -> Renderer {
    let mut renderer = Renderer::new();
    renderer.feed(html);
    renderer.finish();
    renderer
}

/// Render a document in chunks of `size` characters.
pub fn render_chunked(html: &str, size: usize) -> Renderer {
    assert!(size > 0, "chunk size must be positive");
    let mut renderer = Renderer::new();
    let chars: Vec<char> = html.chars().collect();
    for chunk in chars.chunks(size) {
        let chunk: String = chunk.iter().collect();
        renderer.feed(&chunk);
    }
    renderer.finish();
    renderer
}

/// One line per stream item:
///
/// ```text
/// text "a b" [li list1 ul]
/// image "pic.png" [p] attached
/// control submit#0 [form]
/// ```
pub fn snapshot(items: &[OutputItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            OutputItem::Text(run) => {
                format!("text \"{}\" [{}]", escape_text(&run.text), join_tags(&run.tags))
            }
            OutputItem::Image(placeholder) => format!(
                "image \"{}\" [{}]{}",
                escape_text(&placeholder.name),
                join_tags(&placeholder.tags),
                if placeholder.image.is_some() {
                    " attached"
                } else {
                    ""
                }
            ),
            OutputItem::Control(placeholder) => {
                let kind = match placeholder.kind {
                    richtext::ControlKind::FileChooser => "file",
                    richtext::ControlKind::Submit => "submit",
                };
                format!(
                    "control {kind}#{} [{}]",
                    placeholder.id.0,
                    join_tags(&placeholder.tags)
                )
            }
        })
        .collect()
}

fn join_tags(tags: &richtext::TagSet) -> String {
    tags.iter().collect::<Vec<_>>().join(" ")
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{00A0}' => out.push_str("\\u{A0}"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    let mut out = String::new();
    use std::fmt::Write;
    let missing = "<missing>";
    let mut mismatch = None;
    for i in 0..max {
        let left = expected.get(i).map(String::as_str).unwrap_or(missing);
        let right = actual.get(i).map(String::as_str).unwrap_or(missing);
        if left != right {
            mismatch = Some(i);
            break;
        }
    }
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let left = expected
                .get(line_idx)
                .map(String::as_str)
                .unwrap_or(missing);
            let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
            let marker = if line_idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

/// Assert the stream snapshot matches `expected`, with a readable diff.
pub fn assert_snapshot(renderer: &Renderer, expected: &[&str]) {
    let actual = snapshot(renderer.stream());
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    assert!(
        actual == expected,
        "stream snapshot mismatch:\n{}",
        diff_lines(&expected, &actual)
    );
}

/// Assert that rendering `html` in chunks of each given size produces the
/// same stream as the unchunked render.
pub fn assert_chunking_invariant(html: &str, sizes: &[usize]) {
    let whole = snapshot(render(html).stream());
    for &size in sizes {
        let chunked = snapshot(render_chunked(html, size).stream());
        assert!(
            chunked == whole,
            "chunk size {size} diverged:\n{}",
            diff_lines(&whole, &chunked)
        );
    }
}
