//! Per-language template catalogues.
//!
//! A [`TemplateSet`] maps `(entity kind, flavor)` pairs to `MiniJinja`
//! template text for one target language. Catalogues are plain YAML data: the
//! built-in ones are embedded in the binary and others can be loaded with
//! [`TemplateSet::from_yaml`], so supporting a new language never requires
//! code. A key absent from a catalogue is not an error; callers skip the
//! entity and record a [`TemplateMissError`].
//!
//! ```rust
//! use scenario_publisher::templates::{EntityKind, Flavor, TemplateKey, TemplateSet};
//!
//! let set = TemplateSet::builtin("ruby").expect("ruby is built in");
//! assert!(set.contains(TemplateKey::new(EntityKind::ActionWord, Flavor::Stub)));
//! ```

mod catalogue;
mod filters;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::diagnostics::TemplateMissError;

pub use catalogue::BUILTIN_LANGUAGES;

/// Kind of model node a template renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Authored scenario.
    Scenario,
    /// Flattened test.
    Test,
    /// Action word definition.
    ActionWord,
    /// Action word call step.
    Call,
    /// `if` step.
    Conditional,
    /// `while` step.
    Loop,
    /// Expected result step.
    Result,
    /// Comment step.
    Comment,
    /// Assignment step.
    Assign,
    /// String literal.
    String,
    /// Numeric literal.
    Number,
    /// Variable reference.
    Variable,
    /// Interpolated string.
    Template,
    /// Operator expression.
    Operation,
    /// Parenthesised expression.
    Parenthesis,
    /// List literal.
    List,
}

impl EntityKind {
    const ALL: [Self; 16] = [
        Self::Scenario,
        Self::Test,
        Self::ActionWord,
        Self::Call,
        Self::Conditional,
        Self::Loop,
        Self::Result,
        Self::Comment,
        Self::Assign,
        Self::String,
        Self::Number,
        Self::Variable,
        Self::Template,
        Self::Operation,
        Self::Parenthesis,
        Self::List,
    ];

    /// Catalogue key for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scenario => "scenario",
            Self::Test => "test",
            Self::ActionWord => "actionword",
            Self::Call => "call",
            Self::Conditional => "conditional",
            Self::Loop => "loop",
            Self::Result => "result",
            Self::Comment => "comment",
            Self::Assign => "assign",
            Self::String => "string",
            Self::Number => "number",
            Self::Variable => "variable",
            Self::Template => "template",
            Self::Operation => "operation",
            Self::Parenthesis => "parenthesis",
            Self::List => "list",
        }
    }
}

/// How an entity is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flavor {
    /// Whole file aggregating every entity of a kind.
    CombinedFile,
    /// File name of the aggregated file.
    CombinedFileName,
    /// Whole file holding a single entity (split export).
    EntityFile,
    /// File name of a single-entity file.
    EntityFileName,
    /// The entity itself, embedded in a file or in an enclosing construct.
    Fragment,
    /// Implementation stub printed in action word reports.
    Stub,
}

impl Flavor {
    const ALL: [Self; 6] = [
        Self::CombinedFile,
        Self::CombinedFileName,
        Self::EntityFile,
        Self::EntityFileName,
        Self::Fragment,
        Self::Stub,
    ];

    /// Name used in catalogue keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CombinedFile => "combined_file",
            Self::CombinedFileName => "combined_file_name",
            Self::EntityFile => "entity_file",
            Self::EntityFileName => "entity_file_name",
            Self::Fragment => "fragment",
            Self::Stub => "stub",
        }
    }
}

fn parse_name<T: Copy>(all: &[T], name: &str, as_str: fn(T) -> &'static str) -> Option<T> {
    all.iter().copied().find(|item| as_str(*item) == name)
}

impl FromStr for EntityKind {
    type Err = TemplateSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(&Self::ALL, s, Self::as_str).ok_or_else(|| TemplateSetError::UnknownKind {
            name: s.to_owned(),
        })
    }
}

impl FromStr for Flavor {
    type Err = TemplateSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(&Self::ALL, s, Self::as_str).ok_or_else(|| TemplateSetError::UnknownFlavor {
            name: s.to_owned(),
        })
    }
}

/// Lookup key of a template: `kind.flavor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateKey {
    /// Rendered node kind.
    pub kind: EntityKind,
    /// Template role.
    pub flavor: Flavor,
}

impl TemplateKey {
    /// Key for `kind.flavor`.
    #[must_use]
    pub const fn new(kind: EntityKind, flavor: Flavor) -> Self {
        Self { kind, flavor }
    }

    /// Shorthand for the fragment of a step or expression kind.
    #[must_use]
    pub const fn fragment(kind: EntityKind) -> Self {
        Self::new(kind, Flavor::Fragment)
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.as_str(), self.flavor.as_str())
    }
}

/// Errors raised while loading a catalogue. These abort the run: a broken
/// catalogue cannot produce trustworthy output.
#[derive(Debug, Error)]
pub enum TemplateSetError {
    /// No catalogue ships for the requested language.
    #[error("no built-in templates for language '{language}' (available: {available})")]
    UnknownLanguage {
        /// Requested language.
        language: String,
        /// Comma separated built-in languages.
        available: String,
    },

    /// The catalogue YAML does not follow the catalogue layout.
    #[error("template catalogue is not valid: {message}")]
    Catalogue {
        /// Parser error text.
        message: String,
    },

    /// A key names an unknown entity kind.
    #[error("unknown entity kind '{name}' in template catalogue")]
    UnknownKind {
        /// Kind as written.
        name: String,
    },

    /// A key names an unknown flavor.
    #[error("unknown template flavor '{name}' in template catalogue")]
    UnknownFlavor {
        /// Flavor as written.
        name: String,
    },

    /// A template has a syntax error.
    #[error("template '{key}' does not compile")]
    Compile {
        /// Offending template.
        key: TemplateKey,
        /// Template engine error.
        #[source]
        source: minijinja::Error,
    },
}

/// Failure to render one template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template does not exist.
    #[error(transparent)]
    Missing(#[from] TemplateMissError),

    /// The template raised an error while rendering.
    #[error("template '{key}' failed to render")]
    Failed {
        /// Failing template.
        key: TemplateKey,
        /// Template engine error.
        #[source]
        source: minijinja::Error,
    },
}

/// Compiled templates of one target language.
///
/// The set is immutable once loaded and may be shared between threads.
pub struct TemplateSet {
    language: String,
    indent: String,
    keys: BTreeSet<TemplateKey>,
    env: Environment<'static>,
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("language", &self.language)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl TemplateSet {
    /// Load the catalogue embedded for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateSetError::UnknownLanguage`] when no catalogue ships
    /// for `language`, or a compile error if the embedded catalogue is broken.
    pub fn builtin(language: &str) -> Result<Self, TemplateSetError> {
        let source = catalogue::builtin_source(language).ok_or_else(|| {
            TemplateSetError::UnknownLanguage {
                language: language.to_owned(),
                available: BUILTIN_LANGUAGES.join(", "),
            }
        })?;
        Self::from_yaml(source)
    }

    /// Load a catalogue from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML does not follow the catalogue schema,
    /// names an unknown kind or flavor, or holds a template that does not
    /// compile.
    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateSetError> {
        let catalogue = catalogue::Catalogue::from_yaml(yaml)?;
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        filters::register(&mut env, &catalogue.indent);

        let mut keys = BTreeSet::new();
        for (key, text) in catalogue.templates {
            env.add_template_owned(key.to_string(), text)
                .map_err(|source| TemplateSetError::Compile { key, source })?;
            keys.insert(key);
        }
        debug!(language = %catalogue.language, templates = keys.len(), "template catalogue loaded");
        Ok(Self {
            language: catalogue.language,
            indent: catalogue.indent,
            keys,
            env,
        })
    }

    /// Language named by the catalogue.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// One level of indentation in the target language.
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Whether the catalogue defines `key`.
    #[must_use]
    pub fn contains(&self, key: TemplateKey) -> bool {
        self.keys.contains(&key)
    }

    /// Render the template stored under `key` with `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Missing`] when the catalogue has no such
    /// template and [`RenderError::Failed`] when rendering fails.
    pub fn render<S: Serialize>(&self, key: TemplateKey, ctx: S) -> Result<String, RenderError> {
        if !self.contains(key) {
            return Err(RenderError::Missing(TemplateMissError {
                language: self.language.clone(),
                key: key.to_string(),
            }));
        }
        self.env
            .get_template(&key.to_string())
            .and_then(|template| template.render(ctx))
            .map_err(|source| RenderError::Failed { key, source })
    }
}
