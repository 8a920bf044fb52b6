//! End-to-end rendering of block structure, whitespace and inline content.

use richtext_test_support::{assert_chunking_invariant, assert_snapshot, render};

#[test]
fn heading_and_paragraph_document() {
    let renderer = render("<h1>Title</h1><p>Intro <b>bold</b> text.</p>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"Title\\n\" [h1]",
            "text \"\\u{A0}\\n\" []",
            "text \"Intro \" [p]",
            "text \"bold\" [p strong]",
            "text \" text.\\n\" [p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn paragraph_whitespace_collapses() {
    let renderer = render("<p>a\n  b\t\tc</p>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"a b\\t\\tc\\n\" [p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn preformatted_text_is_preserved() {
    let renderer = render("<p>before</p><pre>\ncode  line\n\tindent\n</pre><p>after</p>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"before\\n\" [p]",
            "text \"\\u{A0}\\n\" []",
            "text \"code  line\\n\\tindent\\n\" [pre]",
            "text \"\\u{A0}\\n\" []",
            "text \"after\\n\" [p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn entities_decode_in_flowing_text() {
    let renderer = render("<p>&copy; 2024 &mdash; a &amp; b</p>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"\u{00A9} 2024 \u{2014} a & b\\n\" [p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn image_placeholder_sits_inline() {
    let renderer = render("<p>see <img src='pic.png'> here</p>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"see \" [p]",
            "image \"pic.png\" [img p]",
            "text \" here\\n\" [p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn link_text_carries_anchor_and_target_tags() {
    let renderer = render("<p>go <a href=\"https://example.com/x\">there</a></p>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"go \" [p]",
            "text \"there\\n\" [a https://example.com/x p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn details_and_summary_are_blocks() {
    let renderer = render("<details><summary>More</summary><p>body</p></details>");
    assert_snapshot(
        &renderer,
        &[
            "text \"\\n\" []",
            "text \"More\\n\" [details summary]",
            "text \"\\u{A0}\\n\" []",
            "text \"body\\n\" [details p]",
            "text \"\\u{A0}\\n\" []",
        ],
    );
}

#[test]
fn chunking_is_invariant() {
    let html = "<!DOCTYPE html><h1>T</h1><p>a &amp; b <b>c</b></p>\
                <ul><li>x<li>y</ul><pre>\nkeep  this\n</pre>\
                <!-- comment --><p>see <img src=\"p.png\"> here</p>\
                <form action='/go'><input type=hidden name=h value=1>\
                <input type=submit name=s value=Go></form>trailing";
    assert_chunking_invariant(html, &[1, 2, 3, 7, 64, 128, 1024]);
}

#[test]
fn unclosed_blocks_still_render() {
    let renderer = render("<div><p>open");
    assert_snapshot(
        &renderer,
        &["text \"\\n\" []", "text \"open\" [div p]"],
    );
}
