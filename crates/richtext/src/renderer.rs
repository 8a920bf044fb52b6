//! The event dispatcher: consumes tokens, maintains the open-context, list
//! and form state, and emits styled runs and placeholders into the output
//! stream. Resumable across token and chunk boundaries.

use std::collections::HashMap;

use crate::context::{ContextEntry, TagContextStack, TagKind};
use crate::form::{FieldValueSource, FormData, FormInput, FormStack};
use crate::lists::{ListKind, ListStack};
use crate::output::{
    ControlId, ControlKind, ControlPlaceholder, ImageHandle, ImagePlaceholder, LIST_BULLET, NBSP,
    OutputItem, OutputStream, TagSet,
};
use crate::tokenizer::Tokenizer;
use crate::types::{AttrList, Token, attr_value};

const RULE_WIDTH: usize = 40;

/// Syntactic link test: a tag identifier containing `:`, `/` or `!` is an
/// actionable target (URL, path or command), not a style name.
pub fn is_link_like(tag: &str) -> bool {
    tag.contains([':', '/', '!'])
}

/// Live value lookup for controls referenced by declared form fields.
/// Returning `None` marks the control as detached and aborts the submission.
pub trait ControlValueSource {
    fn current_value(&self, control: ControlId) -> Option<String>;
}

impl ControlValueSource for HashMap<ControlId, String> {
    fn current_value(&self, control: ControlId) -> Option<String> {
        self.get(&control).cloned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// The form's `action` attribute, empty when it had none.
    pub action: String,
    pub data: FormData,
}

#[derive(Clone, Debug)]
struct ControlBinding {
    kind: ControlKind,
    /// Scope the control was emitted in. `None`: declared outside any form.
    form: Option<usize>,
    name: Option<String>,
    label: String,
}

/// Incremental HTML renderer.
///
/// Feed document chunks with [`feed`](Renderer::feed) (or drive an external
/// tokenizer through [`push_token`](Renderer::push_token)), then read the
/// accumulated [`stream`](Renderer::stream). Parsing never fails; malformed
/// input degrades locally.
#[derive(Debug, Default)]
pub struct Renderer {
    tokenizer: Tokenizer,
    output: OutputStream,
    context: TagContextStack,
    lists: ListStack,
    forms: FormStack,
    controls: Vec<ControlBinding>,
    /// Output indices of image placeholders, by symbolic name.
    images: HashMap<String, Vec<usize>>,
    /// Last-seen attributes per open tag, cleared on close.
    attrs_by_tag: HashMap<String, AttrList>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next chunk of the document.
    pub fn feed(&mut self, chunk: &str) {
        let mut tokenizer = std::mem::take(&mut self.tokenizer);
        tokenizer.feed(chunk, &mut |token| self.dispatch(&token));
        self.tokenizer = tokenizer;
    }

    /// Flush text still buffered in the tokenizer. Call once the document is
    /// complete; does not reset any state.
    pub fn finish(&mut self) {
        let mut tokenizer = std::mem::take(&mut self.tokenizer);
        tokenizer.finish(&mut |token| self.dispatch(&token));
        self.tokenizer = tokenizer;
    }

    /// Reset everything for a fresh document, including input held mid-chunk.
    pub fn clear(&mut self) {
        self.tokenizer.reset();
        self.output.clear();
        self.context.clear();
        self.lists.clear();
        self.forms.clear();
        self.controls.clear();
        self.images.clear();
        self.attrs_by_tag.clear();
    }

    /// Seam for driving the dispatcher from an external tokenizer.
    pub fn push_token(&mut self, token: &Token) {
        self.dispatch(token);
    }

    /// The accumulated output, in document order.
    pub fn stream(&self) -> &[OutputItem] {
        self.output.items()
    }

    /// Last-seen attributes of `tag` while it is open; empty once closed.
    pub fn active_attrs(&self, tag: &str) -> Option<&[(String, Option<String>)]> {
        self.attrs_by_tag.get(tag).map(Vec::as_slice)
    }

    /// Resolve an activated (clicked) style tag to its actionable target.
    pub fn activate<'t>(&self, tag: &'t str) -> Option<&'t str> {
        is_link_like(tag).then_some(tag)
    }

    /// Attach decoded image data to every placeholder named `name`. Returns
    /// how many placeholders were updated; unknown names update none.
    pub fn update_image(&mut self, name: &str, image: ImageHandle) -> usize {
        let Some(indices) = self.images.get(name) else {
            return 0;
        };
        let mut updated = 0;
        for &index in indices {
            if self.output.set_image(index, image) {
                updated += 1;
            }
        }
        updated
    }

    /// Collect the form owning `control` and synthesize its submission:
    /// declared fields in order, then the submit control's `(name, label)`
    /// pair. Returns `None` when the control is not a submit, is bound to no
    /// form, or a referenced control has no value to give.
    pub fn collect_and_submit(
        &self,
        control: ControlId,
        values: &dyn ControlValueSource,
    ) -> Option<Submission> {
        let binding = self.controls.get(control.0 as usize)?;
        if binding.kind != ControlKind::Submit {
            return None;
        }
        let Some(form) = binding.form else {
            log::debug!(
                target: "richtext.form",
                "submit control {:?} is bound to no form",
                control
            );
            return None;
        };
        let scope = self.forms.scope(form);
        let mut data = FormData::new();
        for input in &scope.inputs {
            let Some(name) = input.name.as_deref() else {
                continue;
            };
            match &input.source {
                FieldValueSource::Literal(None) => {}
                FieldValueSource::Literal(Some(value)) => data.add(name, value.clone()),
                FieldValueSource::ExternalRef(id) => match values.current_value(*id) {
                    Some(value) => data.add(name, value),
                    None => {
                        log::debug!(
                            target: "richtext.form",
                            "aborting submission: control {id:?} for field {name:?} is detached"
                        );
                        return None;
                    }
                },
            }
        }
        if let Some(name) = &binding.name {
            data.add(name.clone(), binding.label.clone());
        }
        Some(Submission {
            action: scope.action.clone().unwrap_or_default(),
            data,
        })
    }

    fn dispatch(&mut self, token: &Token) {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.handle_start(name, attributes, *self_closing),
            Token::EndTag(name) => self.handle_end(name),
            Token::Text(text) => self.handle_text(text),
            Token::Comment(_) | Token::Doctype(_) => {}
        }
    }

    fn handle_start(&mut self, name: &str, attributes: &AttrList, self_closing: bool) {
        let name = name.to_ascii_lowercase();
        let kind = TagKind::parse(&name);
        if kind.is_some_and(TagKind::is_ignored) {
            return;
        }
        let canonical: &str = match kind {
            Some(kind) => kind.name(),
            None => &name,
        };
        self.attrs_by_tag
            .insert(canonical.to_string(), attributes.clone());
        if let Some(kind) = kind {
            if kind.is_block() {
                self.block_divider(kind);
            }
        }
        match kind {
            Some(kind) => self.context.push(ContextEntry::Element(kind)),
            None => self.context.push(ContextEntry::Generic(name.clone())),
        }
        match kind {
            Some(TagKind::A) => {
                if let Some(href) = attr_value(attributes, "href") {
                    self.context.push(ContextEntry::LinkTarget(href.to_string()));
                }
            }
            Some(TagKind::Ul) => self.lists.open(ListKind::Unordered),
            Some(TagKind::Ol) => self.lists.open(ListKind::Ordered),
            Some(TagKind::Li) => self.emit_list_marker(),
            Some(TagKind::Br) => {
                // The NBSP keeps the break from being trimmed by a later
                // block divider.
                let tags = self.effective_tags();
                self.output.append_text(&format!("{NBSP}\n"), tags);
            }
            Some(TagKind::Hr) => {
                let tags = self.effective_tags();
                self.output
                    .append_text(&"\u{2500}".repeat(RULE_WIDTH), tags);
            }
            Some(TagKind::Img) => self.emit_image(attributes),
            Some(TagKind::Form) => self
                .forms
                .open(attr_value(attributes, "action").map(str::to_string)),
            Some(TagKind::Input) => self.handle_input(attributes),
            _ => {}
        }
        if self_closing {
            self.handle_end(&name);
        }
    }

    fn handle_end(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        let kind = TagKind::parse(&name);
        if kind.is_some_and(TagKind::is_ignored) {
            return;
        }
        let canonical: &str = match kind {
            Some(kind) => kind.name(),
            None => &name,
        };
        self.attrs_by_tag.insert(canonical.to_string(), Vec::new());
        match kind {
            Some(TagKind::Ul) => self.lists.close(ListKind::Unordered),
            Some(TagKind::Ol) => self.lists.close(ListKind::Ordered),
            Some(TagKind::Form) => self.forms.close(),
            _ => {}
        }
        self.context.pop_through(canonical);
        if let Some(kind) = kind {
            if kind.is_block() {
                self.block_divider(kind);
            }
        }
    }

    fn handle_text(&mut self, text: &str) {
        let prepared = self.prepare_text(text);
        if prepared.is_empty() {
            return;
        }
        let tags = self.effective_tags();
        self.output.append_text(&prepared, tags);
    }

    /// A paragraph directly inside a list item flows on the marker's line.
    fn block_divider(&mut self, kind: TagKind) {
        if kind == TagKind::P && self.context.top_name() == Some("li") {
            return;
        }
        self.output.block_divider(kind.wants_spacer());
    }

    fn emit_list_marker(&mut self) {
        let marker = match self.lists.current() {
            Some(ListKind::Unordered) => LIST_BULLET.to_string(),
            Some(ListKind::Ordered) => {
                let ordinal = self.lists.next_ordinal().unwrap_or(1);
                format!("{ordinal}.{NBSP}")
            }
            None => {
                log::debug!(target: "richtext.renderer", "list item outside any list");
                return;
            }
        };
        let tags = self.effective_tags();
        self.output.append_text(&marker, tags);
    }

    fn emit_image(&mut self, attributes: &AttrList) {
        let Some(src) = attr_value(attributes, "src") else {
            return;
        };
        let tags = self.effective_tags();
        let index = self.output.push_image(ImagePlaceholder {
            name: src.to_string(),
            tags,
            image: None,
        });
        self.images.entry(src.to_string()).or_default().push(index);
    }

    fn handle_input(&mut self, attributes: &AttrList) {
        let input_type = attr_value(attributes, "type")
            .filter(|t| !t.is_empty())
            .unwrap_or("text");
        let name = attr_value(attributes, "name").map(str::to_string);
        match input_type {
            "hidden" => {
                self.forms.declare(FormInput {
                    name,
                    source: FieldValueSource::Literal(
                        attr_value(attributes, "value").map(str::to_string),
                    ),
                });
            }
            "file" => {
                let id = ControlId(self.controls.len() as u32);
                self.controls.push(ControlBinding {
                    kind: ControlKind::FileChooser,
                    form: self.forms.current(),
                    name: name.clone(),
                    label: String::new(),
                });
                self.forms.declare(FormInput {
                    name,
                    source: FieldValueSource::ExternalRef(id),
                });
                let tags = self.effective_tags();
                self.output.push_control(ControlPlaceholder {
                    id,
                    kind: ControlKind::FileChooser,
                    tags,
                    attributes: attributes.clone(),
                });
            }
            "submit" => {
                let id = ControlId(self.controls.len() as u32);
                let label = attr_value(attributes, "value")
                    .unwrap_or("Submit")
                    .to_string();
                self.controls.push(ControlBinding {
                    kind: ControlKind::Submit,
                    form: self.forms.current(),
                    name,
                    label,
                });
                let tags = self.effective_tags();
                self.output.push_control(ControlPlaceholder {
                    id,
                    kind: ControlKind::Submit,
                    tags,
                    attributes: attributes.clone(),
                });
            }
            other => {
                log::trace!(target: "richtext.renderer", "ignoring input type {other:?}");
            }
        }
    }

    /// Whitespace preparation. Outside `pre`/`code` line breaks become spaces
    /// and space runs collapse; CRLF normalizes to LF; a single leading LF is
    /// dropped even in preformatted context.
    fn prepare_text(&self, text: &str) -> String {
        let preformatted = self.context.contains("pre") || self.context.contains("code");
        let mut prepared = String::with_capacity(text.len());
        if preformatted {
            prepared.push_str(text);
        } else {
            for c in text.chars() {
                let c = if c == '\n' || c == '\r' { ' ' } else { c };
                if c == ' ' && prepared.ends_with(' ') {
                    continue;
                }
                prepared.push(c);
            }
        }
        let mut prepared = prepared.replace("\r\n", "\n");
        if prepared.starts_with('\n') {
            prepared.remove(0);
        }
        prepared
    }

    /// Style tags in effect at the insertion point: every open context entry
    /// plus the list depth tag.
    fn effective_tags(&self) -> TagSet {
        let mut names: Vec<String> = self.context.names().map(str::to_string).collect();
        if let Some(depth_tag) = self.lists.depth_tag() {
            names.push(depth_tag);
        }
        TagSet::from_names(names)
    }
}
