use std::ops::Range;

use super::{SourceDocument, SourceError};
use crate::annotation::Reference;

/// A PHP class file, held as lines.
///
/// Only the parts the synchronizer manages are located: the namespace
/// declaration, the top-level `use` imports, the class declaration and the
/// `/** ... */` block directly above it (attribute lines may sit in between).
/// Every other line is kept verbatim, so printing an unmodified document gives
/// back the input bytes.
///
/// Top-level declarations are told apart from class members by brace depth.
/// Braces inside single-line string literals are skipped; braces inside
/// heredocs, nowdocs or strings spanning several lines are still counted, so
/// an unbalanced brace there can make class-body lines look top-level.
#[derive(Debug, Clone)]
pub struct PhpDocument {
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,

    namespace: String,
    namespace_line: usize,
    uses: Vec<UseLine>,
    class_name: String,
    class_line: usize,
    /// First attribute line above the class, or the class line itself.
    attributes_start: usize,
    doc: Option<Range<usize>>,
}

#[derive(Debug, Clone)]
struct UseLine {
    line: usize,
    reference: Reference,
}

impl PhpDocument {
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let mut lines: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        let trailing_newline = text.ends_with('\n');
        if trailing_newline {
            lines.pop();
        }

        let mut namespaces = Vec::new();
        let mut classes = Vec::new();
        let mut uses = Vec::new();
        let mut docs: Vec<Range<usize>> = Vec::new();
        let mut open_comment: Option<(usize, bool)> = None;
        let mut depth: i64 = 0;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();

            if let Some((start, is_doc)) = open_comment {
                if trimmed.contains("*/") {
                    open_comment = None;
                    if is_doc {
                        docs.push(start..i + 1);
                    }
                }
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("/*") {
                let is_doc = rest.starts_with('*') && !rest.starts_with("*/");
                if rest.contains("*/") {
                    if is_doc {
                        docs.push(i..i + 1);
                    }
                } else {
                    open_comment = Some((i, is_doc));
                }
                continue;
            }

            if trimmed.starts_with("//") || (trimmed.starts_with('#') && !trimmed.starts_with("#[")) {
                continue;
            }

            if depth == 0 {
                if let Some(name) = parse_namespace(trimmed) {
                    namespaces.push((i, name));
                } else if classes.is_empty()
                    && let Some(reference) = parse_use(trimmed)
                {
                    uses.push(UseLine { line: i, reference });
                } else if let Some(name) = parse_class(trimmed) {
                    classes.push((i, name));
                }
            }

            depth += brace_balance(trimmed);
        }

        if let Some((start, _)) = open_comment {
            return Err(SourceError::UnterminatedComment { line: start + 1 });
        }

        let (namespace_line, namespace) = match namespaces.len() {
            0 => return Err(SourceError::MissingNamespace),
            1 => namespaces.remove(0),
            count => return Err(SourceError::MultipleNamespaces { count }),
        };
        let (class_line, class_name) = match classes.len() {
            0 => return Err(SourceError::MissingClass),
            1 => classes.remove(0),
            count => return Err(SourceError::MultipleClasses { count }),
        };

        let mut attributes_start = class_line;
        while attributes_start > 0 && lines[attributes_start - 1].trim_start().starts_with("#[") {
            attributes_start -= 1;
        }
        // Blank lines may separate the block from the class.
        let mut doc_end = attributes_start;
        while doc_end > 0 && lines[doc_end - 1].trim().is_empty() {
            doc_end -= 1;
        }
        let doc = docs.into_iter().find(|range| range.end == doc_end);

        Ok(Self {
            lines,
            newline,
            trailing_newline,
            namespace,
            namespace_line,
            uses,
            class_name,
            class_line,
            attributes_start,
            doc,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    fn indent(&self) -> &str {
        let line = &self.lines[self.class_line];
        &line[..line.len() - line.trim_start().len()]
    }

    /// Insert `new` lines at `at`, moving every located line at or after it.
    fn insert_lines(&mut self, at: usize, new: Vec<String>) {
        let count = new.len();
        self.lines.splice(at..at, new);
        let shift = |line: &mut usize| {
            if *line >= at {
                *line += count;
            }
        };
        self.shift_all(shift);
    }

    /// Remove the lines in `range`, which must not contain a located line
    /// other than a `use` or the doc block.
    fn remove_lines(&mut self, range: Range<usize>) {
        let count = range.len();
        let end = range.end;
        self.lines.drain(range);
        let shift = |line: &mut usize| {
            if *line >= end {
                *line -= count;
            }
        };
        self.shift_all(shift);
    }

    fn shift_all(&mut self, shift: impl Fn(&mut usize)) {
        shift(&mut self.namespace_line);
        shift(&mut self.class_line);
        shift(&mut self.attributes_start);
        for use_line in &mut self.uses {
            shift(&mut use_line.line);
        }
        if let Some(doc) = &mut self.doc {
            shift(&mut doc.start);
            shift(&mut doc.end);
        }
    }
}

impl SourceDocument for PhpDocument {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn comment_lines(&self) -> Vec<String> {
        let Some(doc) = &self.doc else {
            return Vec::new();
        };
        let mut out: Vec<String> = self.lines[doc.clone()]
            .iter()
            .map(|line| strip_decoration(line).to_string())
            .collect();
        while out.first().is_some_and(|l| l.is_empty()) {
            out.remove(0);
        }
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        out
    }

    fn set_comment_lines(&mut self, lines: Vec<String>) {
        if lines == self.comment_lines() {
            return;
        }

        let rendered = if lines.is_empty() {
            Vec::new()
        } else {
            let indent = self.indent().to_string();
            let mut rendered = Vec::with_capacity(lines.len() + 2);
            rendered.push(format!("{indent}/**"));
            for line in &lines {
                if line.is_empty() {
                    rendered.push(format!("{indent} *"));
                } else {
                    rendered.push(format!("{indent} * {line}"));
                }
            }
            rendered.push(format!("{indent} */"));
            rendered
        };

        let at = match self.doc.take() {
            Some(doc) => {
                let start = doc.start;
                self.remove_lines(doc);
                start
            }
            None => self.attributes_start,
        };
        if !rendered.is_empty() {
            let len = rendered.len();
            self.insert_lines(at, rendered);
            self.doc = Some(at..at + len);
        }
    }

    fn references(&self) -> Vec<Reference> {
        self.uses.iter().map(|u| u.reference.clone()).collect()
    }

    fn add_reference(&mut self, reference: &Reference) -> bool {
        if reference.namespace() == self.namespace {
            return false;
        }
        if self.uses.iter().any(|u| &u.reference == reference) {
            return false;
        }

        let line = format!("use {reference};");
        let position = self.uses.iter().position(|u| &u.reference > reference);
        let (at, new_lines, index) = match (position, self.uses.last()) {
            (Some(index), _) => (self.uses[index].line, vec![line], index),
            (None, Some(last)) => (last.line + 1, vec![line], self.uses.len()),
            (None, None) => (self.namespace_line + 1, vec![String::new(), line], 0),
        };
        let use_line = at + new_lines.len() - 1;
        self.insert_lines(at, new_lines);
        self.uses.insert(
            index,
            UseLine {
                line: use_line,
                reference: reference.clone(),
            },
        );
        true
    }

    fn remove_reference(&mut self, reference: &Reference) -> bool {
        let Some(index) = self.uses.iter().position(|u| &u.reference == reference) else {
            return false;
        };
        let line = self.uses.remove(index).line;
        self.remove_lines(line..line + 1);

        // Last import gone: collapse the blank pair it sat between.
        if self.uses.is_empty()
            && line > 0
            && line < self.lines.len()
            && self.lines[line - 1].trim().is_empty()
            && self.lines[line].trim().is_empty()
        {
            self.remove_lines(line - 1..line);
        }
        true
    }

    fn print(&self) -> String {
        let mut out = self.lines.join(self.newline);
        if self.trailing_newline {
            out.push_str(self.newline);
        }
        out
    }
}

fn parse_namespace(line: &str) -> Option<String> {
    let rest = line.strip_prefix("namespace ")?;
    let name = rest.trim_end().strip_suffix(';')?.trim();
    if name.is_empty() {
        return None;
    }
    Some(name.trim_start_matches('\\').to_string())
}

fn parse_use(line: &str) -> Option<Reference> {
    let rest = line.strip_prefix("use ")?.trim_end().strip_suffix(';')?.trim();
    if rest.starts_with("function ") || rest.starts_with("const ") || rest.contains('{') {
        return None;
    }
    let name = match rest.split_once(" as ") {
        Some((name, _alias)) => name.trim(),
        None => rest,
    };
    Some(Reference::new(name))
}

fn parse_class(line: &str) -> Option<String> {
    let mut rest = line;
    loop {
        let next = ["final ", "abstract ", "readonly "]
            .iter()
            .find_map(|modifier| rest.strip_prefix(modifier));
        match next {
            Some(stripped) => rest = stripped.trim_start(),
            None => break,
        }
    }
    let rest = rest.strip_prefix("class ")?.trim_start();
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() { None } else { Some(name) }
}

/// Opened minus closed braces on one line, ignoring braces inside quoted
/// strings that open and close on that line.
fn brace_balance(line: &str) -> i64 {
    let mut balance = 0;
    let mut quote = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '{') => balance += 1,
            (None, '}') => balance -= 1,
            (None, _) => {}
        }
    }
    balance
}

/// `/**`, `*/` and the leading ` * ` of one doc block line.
fn strip_decoration(line: &str) -> &str {
    let mut text = line.trim();
    if let Some(rest) = text.strip_prefix("/**") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("*/") {
        text = rest;
    }
    let text = text.trim();
    let text = match text.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => text,
    };
    text.trim_end()
}
