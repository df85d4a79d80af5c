//! Catalogue schema and the catalogues embedded in the binary.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{EntityKind, Flavor, TemplateKey, TemplateSetError};

/// Languages with an embedded catalogue.
pub const BUILTIN_LANGUAGES: [&str; 3] = ["ruby", "python", "seleniumide"];

const RUBY: &str = include_str!("../../templates/ruby.yaml");
const PYTHON: &str = include_str!("../../templates/python.yaml");
const SELENIUM_IDE: &str = include_str!("../../templates/seleniumide.yaml");

pub(super) fn builtin_source(language: &str) -> Option<&'static str> {
    match language {
        "ruby" => Some(RUBY),
        "python" => Some(PYTHON),
        "seleniumide" => Some(SELENIUM_IDE),
        _ => None,
    }
}

fn default_indent() -> String {
    "  ".to_owned()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalogue {
    language: String,
    #[serde(default = "default_indent")]
    indent: String,
    #[serde(default)]
    templates: BTreeMap<String, BTreeMap<String, String>>,
}

/// A parsed catalogue with validated keys.
pub(super) struct Catalogue {
    pub(super) language: String,
    pub(super) indent: String,
    pub(super) templates: BTreeMap<TemplateKey, String>,
}

impl Catalogue {
    pub(super) fn from_yaml(yaml: &str) -> Result<Self, TemplateSetError> {
        let value: serde_json::Value =
            serde_saphyr::from_str(yaml).map_err(|err| TemplateSetError::Catalogue {
                message: err.to_string(),
            })?;
        let raw: RawCatalogue =
            serde_json::from_value(value).map_err(|err| TemplateSetError::Catalogue {
                message: err.to_string(),
            })?;

        let mut templates = BTreeMap::new();
        for (kind_name, flavors) in raw.templates {
            let kind: EntityKind = kind_name.parse()?;
            for (flavor_name, source) in flavors {
                let flavor: Flavor = flavor_name.parse()?;
                templates.insert(TemplateKey::new(kind, flavor), source);
            }
        }
        Ok(Self {
            language: raw.language,
            indent: raw.indent,
            templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn every_builtin_language_has_a_source() {
        for language in BUILTIN_LANGUAGES {
            assert!(builtin_source(language).is_some(), "{language}");
        }
    }

    #[rstest]
    fn selenium_catalogue_has_no_action_words() {
        let catalogue = Catalogue::from_yaml(SELENIUM_IDE).expect("parse selenium");
        assert!(
            catalogue
                .templates
                .keys()
                .all(|key| key.kind != EntityKind::ActionWord)
        );
    }

    #[rstest]
    fn indent_defaults_to_two_spaces() {
        let catalogue = Catalogue::from_yaml("language: x\n").expect("parse");
        assert_eq!(catalogue.indent, "  ");
        assert!(catalogue.templates.is_empty());
    }
}
