//! Append-only output stream: styled text runs and inline placeholders.
//!
//! The stream is the single source of truth the embedding viewport renders
//! from. Every normalization decision (trailing trim, space dedup, spacer
//! insertion) consults only the trailing one or two characters plus a
//! maintained newline count, never the whole stream.

use std::collections::BTreeSet;

pub const NBSP: char = '\u{00A0}';

/// Marker prefixed to unordered list items.
pub const LIST_BULLET: &str = "\u{2022}\u{00A0}";

/// Vertical spacer: a line whose only content is a no-break space. The NBSP
/// is outside the trimmed whitespace class, which is what keeps repeated
/// divider passes idempotent.
pub const SPACER: &str = "\u{00A0}\n";

/// Sorted, deduplicated set of style tag names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet {
    names: Vec<String>,
}

impl TagSet {
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub tags: TagSet,
}

/// Opaque handle to decoded image data owned by the embedder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePlaceholder {
    /// Symbolic name from the `src` attribute; `update_image` re-targets by it.
    pub name: String,
    pub tags: TagSet,
    pub image: Option<ImageHandle>,
}

/// Dense index into the renderer's control registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    FileChooser,
    Submit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlPlaceholder {
    pub id: ControlId,
    pub kind: ControlKind,
    pub tags: TagSet,
    pub attributes: Vec<(String, Option<String>)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputItem {
    Text(StyledRun),
    Image(ImagePlaceholder),
    Control(ControlPlaceholder),
}

/// The document being produced. Placeholders act as barriers: trimming and
/// tail-character checks never look past one.
#[derive(Clone, Debug, Default)]
pub(crate) struct OutputStream {
    items: Vec<OutputItem>,
    /// Count of `\n` currently in the stream, maintained on every push/trim.
    newlines: usize,
}

impl OutputStream {
    pub(crate) fn items(&self) -> &[OutputItem] {
        &self.items
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.newlines = 0;
    }

    /// Append a run, coalescing into the previous one when the tag sets match.
    pub(crate) fn push_run(&mut self, text: &str, tags: TagSet) {
        if text.is_empty() {
            return;
        }
        self.newlines += text.matches('\n').count();
        if let Some(OutputItem::Text(run)) = self.items.last_mut() {
            if run.tags == tags {
                run.text.push_str(text);
                return;
            }
        }
        self.items.push(OutputItem::Text(StyledRun {
            text: text.to_string(),
            tags,
        }));
    }

    /// Index of the placeholder just pushed.
    pub(crate) fn push_image(&mut self, placeholder: ImagePlaceholder) -> usize {
        self.items.push(OutputItem::Image(placeholder));
        self.items.len() - 1
    }

    pub(crate) fn push_control(&mut self, placeholder: ControlPlaceholder) {
        self.items.push(OutputItem::Control(placeholder));
    }

    pub(crate) fn set_image(&mut self, index: usize, image: ImageHandle) -> bool {
        match self.items.get_mut(index) {
            Some(OutputItem::Image(placeholder)) => {
                placeholder.image = Some(image);
                true
            }
            _ => false,
        }
    }

    /// Append prepared text, deduplicating horizontal whitespace against the
    /// stream tail: trailing spaces/tabs come off first (their tag union
    /// remembered); after a line break or NBSP the incoming run loses its
    /// leading horizontal whitespace; otherwise a single remembered space is
    /// restored unless the run starts with one.
    pub(crate) fn append_text(&mut self, text: &str, tags: TagSet) {
        let mut had_trailing_space = false;
        let mut trailing_tags: BTreeSet<String> = BTreeSet::new();
        loop {
            let Some(OutputItem::Text(run)) = self.items.last_mut() else {
                break;
            };
            match run.text.chars().last() {
                Some(' ') | Some('\t') => {
                    run.text.pop();
                    had_trailing_space = true;
                    for tag in run.tags.iter() {
                        trailing_tags.insert(tag.to_string());
                    }
                    if run.text.is_empty() {
                        self.items.pop();
                    }
                }
                _ => break,
            }
        }
        let mut text = text;
        if matches!(self.tail_char(), Some('\n') | Some(NBSP)) {
            // Horizontal whitespace never opens a line.
            had_trailing_space = false;
            text = text.trim_start_matches([' ', '\t']);
        }
        if had_trailing_space && !text.starts_with([' ', '\t']) {
            self.push_run(" ", TagSet::from_names(trailing_tags));
        }
        self.push_run(text, tags);
    }

    /// Remove trailing CR, LF, tab and space characters (NBSP stays).
    pub(crate) fn trim_trailing_whitespace(&mut self) {
        loop {
            let Some(OutputItem::Text(run)) = self.items.last_mut() else {
                return;
            };
            while let Some(c) = run.text.chars().last() {
                if !matches!(c, '\r' | '\n' | '\t' | ' ') {
                    break;
                }
                run.text.pop();
                if c == '\n' {
                    self.newlines -= 1;
                }
            }
            if run.text.is_empty() {
                self.items.pop();
            } else {
                return;
            }
        }
    }

    /// Block divider: trim trailing whitespace, end the line, and (for spacer
    /// blocks) add a blank spacer line unless one is already there or the
    /// divider's newline is the first in the stream. Idempotent.
    pub(crate) fn block_divider(&mut self, spacer: bool) {
        self.trim_trailing_whitespace();
        let tags = self.tail_tags();
        self.push_run("\n", tags);
        if spacer && self.newlines >= 2 && self.last_chars(2) != [NBSP, '\n'] {
            self.push_run(SPACER, TagSet::default());
        }
    }

    fn tail_char(&self) -> Option<char> {
        match self.items.last() {
            Some(OutputItem::Text(run)) => run.text.chars().last(),
            _ => None,
        }
    }

    /// Tags of the last item, placeholder or text. The divider's newline
    /// inherits them so a line stays uniformly styled to its end.
    fn tail_tags(&self) -> TagSet {
        match self.items.last() {
            Some(OutputItem::Text(run)) => run.tags.clone(),
            Some(OutputItem::Image(placeholder)) => placeholder.tags.clone(),
            Some(OutputItem::Control(placeholder)) => placeholder.tags.clone(),
            None => TagSet::default(),
        }
    }

    /// Up to `n` trailing characters in document order, stopping at a
    /// placeholder.
    fn last_chars(&self, n: usize) -> Vec<char> {
        let mut out = Vec::with_capacity(n);
        'items: for item in self.items.iter().rev() {
            let OutputItem::Text(run) = item else {
                break;
            };
            for c in run.text.chars().rev() {
                out.push(c);
                if out.len() == n {
                    break 'items;
                }
            }
        }
        out.reverse();
        out
    }

    #[cfg(test)]
    fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            if let OutputItem::Text(run) = item {
                out.push_str(&run.text);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> TagSet {
        TagSet::from_names(names.iter().copied())
    }

    #[test]
    fn tag_set_sorts_and_dedups() {
        let t = tags(&["ul", "li", "ul", "list1"]);
        assert_eq!(t.iter().collect::<Vec<_>>(), vec!["li", "list1", "ul"]);
    }

    #[test]
    fn adjacent_runs_with_equal_tags_coalesce() {
        let mut stream = OutputStream::default();
        stream.push_run("a", tags(&["p"]));
        stream.push_run("b", tags(&["p"]));
        stream.push_run("c", tags(&["em", "p"]));
        assert_eq!(stream.items().len(), 2);
        assert!(
            matches!(&stream.items()[0], OutputItem::Text(run) if run.text == "ab"),
            "expected coalesced run, got: {:?}",
            stream.items()[0]
        );
    }

    #[test]
    fn append_dedups_trailing_space() {
        let mut stream = OutputStream::default();
        stream.append_text("a ", tags(&["p"]));
        stream.append_text(" b", tags(&["p"]));
        assert_eq!(stream.text(), "a b");
    }

    #[test]
    fn restored_space_keeps_the_old_tags() {
        let mut stream = OutputStream::default();
        stream.append_text("a ", tags(&["strong"]));
        stream.append_text("b", tags(&[]));
        let items = stream.items();
        assert!(
            matches!(&items[0], OutputItem::Text(run)
                if run.text == "a " && run.tags.contains("strong")),
            "expected tagged space, got: {:?}",
            items[0]
        );
        assert!(
            matches!(&items[1], OutputItem::Text(run) if run.text == "b"),
            "got: {:?}",
            items[1]
        );
    }

    #[test]
    fn no_leading_space_after_line_break() {
        let mut stream = OutputStream::default();
        stream.push_run("a\n", tags(&[]));
        stream.append_text("  b", tags(&[]));
        assert_eq!(stream.text(), "a\nb");
    }

    #[test]
    fn no_leading_space_after_nbsp() {
        let mut stream = OutputStream::default();
        stream.push_run("\u{00A0}", tags(&[]));
        stream.append_text(" x", tags(&[]));
        assert_eq!(stream.text(), "\u{00A0}x");
    }

    #[test]
    fn trim_stops_at_nbsp() {
        let mut stream = OutputStream::default();
        stream.push_run("a\u{00A0} \t\n", tags(&[]));
        stream.trim_trailing_whitespace();
        assert_eq!(stream.text(), "a\u{00A0}");
    }

    #[test]
    fn trim_crosses_runs() {
        let mut stream = OutputStream::default();
        stream.push_run("a", tags(&["p"]));
        stream.push_run(" \n ", tags(&[]));
        stream.trim_trailing_whitespace();
        assert_eq!(stream.text(), "a");
        assert_eq!(stream.items().len(), 1);
    }

    #[test]
    fn first_divider_adds_no_spacer() {
        let mut stream = OutputStream::default();
        stream.block_divider(true);
        assert_eq!(stream.text(), "\n");
    }

    #[test]
    fn divider_newline_inherits_tail_tags() {
        let mut stream = OutputStream::default();
        stream.block_divider(true);
        stream.append_text("a", tags(&["p"]));
        stream.block_divider(true);
        let items = stream.items();
        assert!(
            matches!(&items[1], OutputItem::Text(run)
                if run.text == "a\n" && run.tags.contains("p")),
            "expected line end inside the p run, got: {:?}",
            items[1]
        );
        assert_eq!(stream.text(), "\na\n\u{00A0}\n");
    }

    #[test]
    fn divider_is_idempotent() {
        let mut stream = OutputStream::default();
        stream.block_divider(true);
        stream.append_text("a", tags(&["p"]));
        stream.block_divider(true);
        let once = stream.text();
        stream.block_divider(true);
        stream.block_divider(true);
        assert_eq!(stream.text(), once);
    }

    #[test]
    fn non_spacer_divider_only_breaks_the_line() {
        let mut stream = OutputStream::default();
        stream.block_divider(false);
        stream.append_text("x", tags(&[]));
        stream.block_divider(false);
        assert_eq!(stream.text(), "\nx\n");
    }

    #[test]
    fn placeholder_is_a_trim_barrier() {
        let mut stream = OutputStream::default();
        stream.push_run("a ", tags(&[]));
        stream.push_image(ImagePlaceholder {
            name: "x.png".to_string(),
            tags: tags(&[]),
            image: None,
        });
        stream.trim_trailing_whitespace();
        assert_eq!(stream.items().len(), 2);
        assert_eq!(stream.text(), "a ");
    }

    #[test]
    fn set_image_targets_only_image_items() {
        let mut stream = OutputStream::default();
        stream.push_run("a", tags(&[]));
        let index = stream.push_image(ImagePlaceholder {
            name: "x.png".to_string(),
            tags: tags(&[]),
            image: None,
        });
        assert!(!stream.set_image(0, ImageHandle(7)));
        assert!(stream.set_image(index, ImageHandle(7)));
        assert!(
            matches!(&stream.items()[index], OutputItem::Image(p) if p.image == Some(ImageHandle(7))),
            "got: {:?}",
            stream.items()[index]
        );
    }
}
