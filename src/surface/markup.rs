//! Tolerant HTML-like markup reader and writer.
//!
//! The reader never fails: unknown constructs are kept as text, unmatched
//! close tags are ignored and unclosed elements are closed at end of input.

/// Elements that never have children or a close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parsed markup node, independent of any surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

/// Parses a markup fragment into its top-level nodes.
pub fn parse(input: &str) -> Vec<MarkupNode> {
    let mut reader = Reader {
        input,
        pos: 0,
        open: Vec::new(),
        roots: Vec::new(),
    };
    reader.run();
    reader.finish()
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
    open: Vec<OpenElement>,
    roots: Vec<MarkupNode>,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if let Some(comment) = rest.strip_prefix("<!--") {
                self.pos += match comment.find("-->") {
                    Some(end) => 4 + end + 3,
                    None => rest.len(),
                };
            } else if starts_tag(rest, "</") {
                self.close_tag();
            } else if starts_tag(rest, "<") {
                self.open_tag();
            } else {
                self.text();
            }
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while !self.open.is_empty() {
            self.close_innermost();
        }
        self.roots
    }

    fn text(&mut self) {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '<')
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        self.push(MarkupNode::Text(decode_entities(&rest[..end])));
    }

    fn open_tag(&mut self) {
        self.pos += 1;
        let tag = self.take_while(is_name_char).to_ascii_lowercase();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            let name = self
                .take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'))
                .to_ascii_lowercase();
            if name.is_empty() {
                // Stray '=' or '/'.
                self.pos += 1;
                continue;
            }
            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()
            } else {
                String::new()
            };
            attributes.push((name, value));
        }

        if self_closing || is_void(&tag) {
            self.push(MarkupNode::Element {
                tag,
                attributes,
                children: Vec::new(),
            });
        } else {
            self.open.push(OpenElement {
                tag,
                attributes,
                children: Vec::new(),
            });
        }
    }

    fn attribute_value(&mut self) -> String {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(end) => {
                        self.pos += end + 2;
                        decode_entities(&body[..end])
                    }
                    None => {
                        self.pos = self.input.len();
                        decode_entities(body)
                    }
                }
            }
            _ => decode_entities(self.take_while(|c| !c.is_whitespace() && c != '>')),
        }
    }

    fn close_tag(&mut self) {
        self.pos += 2;
        let tag = self.take_while(is_name_char).to_ascii_lowercase();
        let rest = self.rest();
        self.pos += rest.find('>').map_or(rest.len(), |i| i + 1);

        if let Some(index) = self.open.iter().rposition(|open| open.tag == tag) {
            while self.open.len() > index {
                self.close_innermost();
            }
        }
    }

    fn close_innermost(&mut self) {
        if let Some(open) = self.open.pop() {
            self.push(MarkupNode::Element {
                tag: open.tag,
                attributes: open.attributes,
                children: open.children,
            });
        }
    }

    fn push(&mut self, node: MarkupNode) {
        let siblings = match self.open.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.roots,
        };
        if let (MarkupNode::Text(more), Some(MarkupNode::Text(text))) = (&node, siblings.last_mut())
        {
            text.push_str(more);
            return;
        }
        siblings.push(node);
    }

    fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        &rest[..end]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }
}

fn starts_tag(rest: &str, opener: &str) -> bool {
    rest.strip_prefix(opener)
        .and_then(|after| after.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match ENTITIES.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, c)) => {
                out.push(*c);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_text(input: &str) -> String {
    escape(input, false)
}

pub fn escape_attribute(input: &str) -> String {
    escape(input, true)
}

fn escape(input: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
