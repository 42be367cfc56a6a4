use indexmap::IndexMap;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "noscript", "iframe", "xmp", "noembed", "noframes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub start_tag: Span,
    /// `None` when the element is never closed before the end of input.
    pub end_tag: Option<Span>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub location: Location,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn content_start(&self) -> usize {
        self.location.start_tag.end
    }
}

/// The top-level element nodes of a markup fragment, in document order.
#[derive(Debug, Clone)]
pub struct Fragment<'a> {
    source: &'a str,
    nodes: Vec<Node>,
}

struct Open {
    name: String,
    top_level: Option<usize>,
}

struct StartTag {
    name: String,
    attrs: IndexMap<String, String>,
    end: usize,
    self_closing: bool,
}

impl<'a> Fragment<'a> {
    pub fn parse(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<Open> = Vec::new();
        let mut pos = 0;

        while let Some(rel) = source[pos..].find('<') {
            let lt = pos + rel;
            let rest = &source[lt..];

            if rest.starts_with("<!--") {
                pos = source[lt + 4..]
                    .find("-->")
                    .map_or(source.len(), |i| lt + 4 + i + 3);
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                pos = skip_past(source, lt, '>');
                continue;
            }
            if rest.starts_with("</") {
                let name = read_name(source, lt + 2);
                if name.is_empty() {
                    pos = lt + 2;
                    continue;
                }
                let end = skip_past(source, lt, '>');
                close(&mut stack, &mut nodes, &name, Span { start: lt, end });
                pos = end;
                continue;
            }
            if !bytes.get(lt + 1).is_some_and(u8::is_ascii_alphabetic) {
                pos = lt + 1;
                continue;
            }

            let Some(tag) = parse_start_tag(source, lt) else {
                // Unterminated start tag: the remainder is text.
                break;
            };
            let start_tag = Span {
                start: lt,
                end: tag.end,
            };
            let top_level = if stack.is_empty() {
                nodes.push(Node {
                    name: tag.name.clone(),
                    attrs: tag.attrs,
                    location: Location {
                        start_tag,
                        end_tag: None,
                    },
                });
                Some(nodes.len() - 1)
            } else {
                None
            };
            pos = tag.end;

            if tag.self_closing || VOID_ELEMENTS.contains(&tag.name.as_str()) {
                if let Some(idx) = top_level {
                    nodes[idx].location.end_tag = Some(Span {
                        start: tag.end,
                        end: tag.end,
                    });
                }
                continue;
            }

            if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                match find_end_tag(source, tag.end, &tag.name) {
                    Some(span) => {
                        if let Some(idx) = top_level {
                            nodes[idx].location.end_tag = Some(span);
                        }
                        pos = span.end;
                    }
                    // Raw text runs to the end of input.
                    None => break,
                }
                continue;
            }

            stack.push(Open {
                name: tag.name,
                top_level,
            });
        }

        Fragment { source, nodes }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First top-level node named `tag`. With a non-empty `langs`, the node must
    /// also carry a `lang` attribute whose value is one of them.
    pub fn find(&self, tag: &str, langs: &[&str]) -> Option<&Node> {
        self.nodes.iter().find(|node| {
            node.name == tag
                && (langs.is_empty() || node.attr("lang").is_some_and(|l| langs.contains(&l)))
        })
    }
}

fn close(stack: &mut Vec<Open>, nodes: &mut [Node], name: &str, span: Span) {
    let Some(depth) = stack.iter().rposition(|open| open.name == name) else {
        return;
    };
    if let Some(idx) = stack[depth].top_level {
        nodes[idx].location.end_tag = Some(span);
    }
    stack.truncate(depth);
}

fn skip_past(source: &str, from: usize, ch: char) -> usize {
    source[from..]
        .find(ch)
        .map_or(source.len(), |i| from + i + ch.len_utf8())
}

fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

fn read_name(source: &str, from: usize) -> String {
    let len = source.as_bytes()[from..]
        .iter()
        .position(|&b| is_name_end(b))
        .unwrap_or(source.len() - from);
    source[from..from + len].to_ascii_lowercase()
}

fn parse_start_tag(source: &str, lt: usize) -> Option<StartTag> {
    let bytes = source.as_bytes();
    let name = read_name(source, lt + 1);
    let mut i = lt + 1 + name.len();
    let mut attrs: IndexMap<String, String> = IndexMap::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    end: i + 1,
                    self_closing: false,
                })
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    end: i + 2,
                    self_closing: true,
                })
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len() && !is_name_end(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        // A leading `=` belongs to the name.
        if i == name_start {
            i += 1;
        }
        let attr_name = source[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let mut value = String::new();
        if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let quote = *bytes.get(j)?;
            if quote == b'"' || quote == b'\'' {
                let close = source[j + 1..].find(quote as char)? + j + 1;
                value = source[j + 1..close].to_string();
                j = close + 1;
            } else {
                let start = j;
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
                value = source[start..j].to_string();
            }
            i = j;
        }

        attrs.entry(attr_name).or_insert(value);
    }
}

/// Locate `</name` (ASCII case-insensitive) followed by a name terminator.
fn find_end_tag(source: &str, from: usize, name: &str) -> Option<Span> {
    let bytes = source.as_bytes();
    let mut pos = from;
    while let Some(rel) = source[pos..].find("</") {
        let start = pos + rel;
        let name_start = start + 2;
        let name_end = name_start + name.len();
        if bytes.len() >= name_end
            && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            && bytes.get(name_end).map_or(true, |&b| is_name_end(b))
        {
            return Some(Span {
                start,
                end: skip_past(source, name_end, '>'),
            });
        }
        pos = name_start;
    }
    None
}
