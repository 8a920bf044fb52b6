//! Tag vocabulary and the open-context stack.

/// The recognized tag vocabulary. Aliases normalize at parse time (`b` →
/// `Strong`, `i` → `Em`); anything outside the vocabulary becomes a generic
/// context entry with no side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKind {
    Div,
    P,
    Ul,
    Ol,
    Li,
    Pre,
    Form,
    H1,
    H2,
    H3,
    Summary,
    Details,
    Hr,
    Br,
    Img,
    A,
    Strong,
    Em,
    Underline,
    Code,
    Small,
    Input,
    Table,
    Span,
}

impl TagKind {
    pub fn parse(name: &str) -> Option<TagKind> {
        Some(match name {
            "div" => TagKind::Div,
            "p" => TagKind::P,
            "ul" => TagKind::Ul,
            "ol" => TagKind::Ol,
            "li" => TagKind::Li,
            "pre" => TagKind::Pre,
            "form" => TagKind::Form,
            "h1" => TagKind::H1,
            "h2" => TagKind::H2,
            "h3" => TagKind::H3,
            "summary" => TagKind::Summary,
            "details" => TagKind::Details,
            "hr" => TagKind::Hr,
            "br" => TagKind::Br,
            "img" => TagKind::Img,
            "a" => TagKind::A,
            "b" | "strong" => TagKind::Strong,
            "i" | "em" => TagKind::Em,
            "u" => TagKind::Underline,
            "code" => TagKind::Code,
            "small" => TagKind::Small,
            "input" => TagKind::Input,
            "table" => TagKind::Table,
            "span" => TagKind::Span,
            _ => return None,
        })
    }

    /// Canonical name, also the style tag recorded on output runs.
    pub fn name(self) -> &'static str {
        match self {
            TagKind::Div => "div",
            TagKind::P => "p",
            TagKind::Ul => "ul",
            TagKind::Ol => "ol",
            TagKind::Li => "li",
            TagKind::Pre => "pre",
            TagKind::Form => "form",
            TagKind::H1 => "h1",
            TagKind::H2 => "h2",
            TagKind::H3 => "h3",
            TagKind::Summary => "summary",
            TagKind::Details => "details",
            TagKind::Hr => "hr",
            TagKind::Br => "br",
            TagKind::Img => "img",
            TagKind::A => "a",
            TagKind::Strong => "strong",
            TagKind::Em => "em",
            TagKind::Underline => "u",
            TagKind::Code => "code",
            TagKind::Small => "small",
            TagKind::Input => "input",
            TagKind::Table => "table",
            TagKind::Span => "span",
        }
    }

    /// Tags that open and close with a block divider pass.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            TagKind::Div
                | TagKind::P
                | TagKind::Ul
                | TagKind::Ol
                | TagKind::Li
                | TagKind::Pre
                | TagKind::Form
                | TagKind::H1
                | TagKind::H2
                | TagKind::Summary
                | TagKind::Details
                | TagKind::Hr
        )
    }

    /// Tags whose divider also inserts the vertical spacer.
    pub fn wants_spacer(self) -> bool {
        matches!(
            self,
            TagKind::P
                | TagKind::Ul
                | TagKind::Ol
                | TagKind::Summary
                | TagKind::Details
                | TagKind::Table
                | TagKind::Pre
        )
    }

    /// Presentation-neutral tags: no context entry, no attribute recording.
    pub fn is_ignored(self) -> bool {
        matches!(self, TagKind::Span)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ContextEntry {
    Element(TagKind),
    /// Tag outside the vocabulary, kept by name.
    Generic(String),
    /// Synthesized from an `a` element's `href`; styles the link text and is
    /// what `activate` later recognizes.
    LinkTarget(String),
}

impl ContextEntry {
    pub(crate) fn name(&self) -> &str {
        match self {
            ContextEntry::Element(kind) => kind.name(),
            ContextEntry::Generic(name) => name,
            ContextEntry::LinkTarget(target) => target,
        }
    }
}

/// Stack of currently open tag contexts with tolerant unwinding.
#[derive(Clone, Debug, Default)]
pub(crate) struct TagContextStack {
    entries: Vec<ContextEntry>,
}

impl TagContextStack {
    pub(crate) fn push(&mut self, entry: ContextEntry) {
        self.entries.push(entry);
    }

    /// Unwind to the nearest entry named `name`, inclusive, discarding
    /// everything opened above it. A name with no match empties the stack.
    pub(crate) fn pop_through(&mut self, name: &str) -> bool {
        while let Some(top) = self.entries.pop() {
            if top.name() == name {
                return true;
            }
            log::trace!(
                target: "richtext.renderer",
                "discarding unclosed context {:?} while closing {name:?}",
                top.name()
            );
        }
        false
    }

    pub(crate) fn top_name(&self) -> Option<&str> {
        self.entries.last().map(ContextEntry::name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name() == name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(ContextEntry::name)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize() {
        assert_eq!(TagKind::parse("b"), Some(TagKind::Strong));
        assert_eq!(TagKind::parse("i"), Some(TagKind::Em));
        assert_eq!(TagKind::parse("strong"), Some(TagKind::Strong));
        assert_eq!(TagKind::parse("blockquote"), None);
    }

    #[test]
    fn block_and_spacer_classes() {
        for name in [
            "div", "p", "ul", "ol", "li", "pre", "form", "h1", "h2", "summary", "details", "hr",
        ] {
            assert!(TagKind::parse(name).unwrap().is_block(), "{name}");
        }
        assert!(!TagKind::A.is_block());
        assert!(!TagKind::H3.is_block());
        assert!(TagKind::P.wants_spacer());
        assert!(!TagKind::Li.wants_spacer());
        assert!(!TagKind::Div.wants_spacer());
    }

    #[test]
    fn pop_through_discards_unmatched_entries() {
        let mut stack = TagContextStack::default();
        stack.push(ContextEntry::Element(TagKind::Ul));
        stack.push(ContextEntry::Element(TagKind::Li));
        stack.push(ContextEntry::Element(TagKind::Strong));
        assert!(stack.pop_through("ul"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pop_through_without_match_empties_the_stack() {
        let mut stack = TagContextStack::default();
        stack.push(ContextEntry::Element(TagKind::Div));
        stack.push(ContextEntry::Element(TagKind::P));
        assert!(!stack.pop_through("table"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn link_target_pops_with_its_anchor() {
        let mut stack = TagContextStack::default();
        stack.push(ContextEntry::Element(TagKind::A));
        stack.push(ContextEntry::LinkTarget("https://example.com".to_string()));
        assert!(stack.pop_through("a"));
        assert_eq!(stack.depth(), 0);
    }
}
