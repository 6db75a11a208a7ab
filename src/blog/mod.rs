pub mod template;

pub use template::PromptTemplate;

use serde::{Deserialize, Serialize};

/// Audience the blog is written for.
///
/// The selector in the form is closed-choice, so these are the only values
/// that ever reach the prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Researchers,
    DataScienceEnthusiasts,
    CommonPeople,
}

impl Style {
    /// All styles in selector order
    pub const ALL: [Style; 3] = [
        Style::Researchers,
        Style::DataScienceEnthusiasts,
        Style::CommonPeople,
    ];

    /// Exact label substituted into the prompt and shown in the selector
    pub fn label(self) -> &'static str {
        match self {
            Style::Researchers => "Researchers",
            Style::DataScienceEnthusiasts => "Data science enthusiasts",
            Style::CommonPeople => "Common people",
        }
    }

    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ALL[idx.checked_sub(1).unwrap_or(Self::ALL.len() - 1)]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One generation request, captured from the form at submit time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlogRequest {
    pub topic: String,
    pub words: String,  // Kept as typed, never parsed
    pub style: Style,
}

impl BlogRequest {
    pub fn new(topic: impl Into<String>, words: impl Into<String>, style: Style) -> Self {
        Self {
            topic: topic.into(),
            words: words.into(),
            style,
        }
    }

    /// Format this request with the given template
    pub fn prompt(&self, template: &PromptTemplate) -> String {
        template.format(self)
    }
}
