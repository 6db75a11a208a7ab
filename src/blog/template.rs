//! Prompt template with named placeholders.
//!
//! Templates use `{blog_style}`, `{topic}` and `{words}`. `{{` and `}}` are
//! literal braces. Values are inserted as-is and never re-expanded.

use thiserror::Error;

use super::BlogRequest;

/// Template used when the config does not provide one
pub const DEFAULT_TEMPLATE: &str =
    "Write a blog for {blog_style} job profile on the topic {topic} in maximum {words} words";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Var {
    BlogStyle,
    Topic,
    Words,
}

impl Var {
    const ALL: [Var; 3] = [Var::BlogStyle, Var::Topic, Var::Words];

    fn name(self) -> &'static str {
        match self {
            Var::BlogStyle => "blog_style",
            Var::Topic => "topic",
            Var::Words => "words",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(Var),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown template variable {{{0}}}")]
    UnknownVariable(String),
    #[error("template never uses {{{0}}}")]
    MissingVariable(&'static str),
    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        // The built-in template always parses
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            segments: vec![
                Segment::Literal("Write a blog for ".to_string()),
                Segment::Var(Var::BlogStyle),
                Segment::Literal(" job profile on the topic ".to_string()),
                Segment::Var(Var::Topic),
                Segment::Literal(" in maximum ".to_string()),
                Segment::Var(Var::Words),
                Segment::Literal(" words".to_string()),
            ],
        }
    }
}

impl PromptTemplate {
    /// Parse a template, checking that it uses exactly the three input variables
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let segments = parse(&source)?;

        for var in Var::ALL {
            if !segments.contains(&Segment::Var(var)) {
                return Err(TemplateError::MissingVariable(var.name()));
            }
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the request into the template. Pure string substitution.
    pub fn format(&self, request: &BlogRequest) -> String {
        let mut out = String::with_capacity(
            self.source.len() + request.topic.len() + request.words.len() + 32,
        );
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(Var::BlogStyle) => out.push_str(request.style.label()),
                Segment::Var(Var::Topic) => out.push_str(&request.topic),
                Segment::Var(Var::Words) => out.push_str(&request.words),
            }
        }
        out
    }
}

fn parse(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|(_, n)| *n) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|(_, n)| *n) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    if n == '{' {
                        return Err(TemplateError::UnbalancedBrace(pos));
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace(pos));
                }
                let var = Var::from_name(name.trim())
                    .ok_or_else(|| TemplateError::UnknownVariable(name.clone()))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Var(var));
            }
            '}' => return Err(TemplateError::UnbalancedBrace(pos)),
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
