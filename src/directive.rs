use crate::fragment::{Fragment, Node};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

static RE_SCOPED_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.+)?style(.+)scoped(.+)?>").unwrap());

/// Where language directives are read from.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveMode {
    /// Attributes of the located node; whole-document scan only when the node is missing.
    #[default]
    Parsed,
    /// Whole-document pattern scan for every slot.
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateLang {
    Pug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleLang {
    Sass,
    Scss,
}

impl TemplateLang {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateLang::Pug => "pug",
        }
    }
}

impl StyleLang {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleLang::Sass => "sass",
            StyleLang::Scss => "scss",
        }
    }
}

impl fmt::Display for TemplateLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StyleLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directives {
    pub template_lang: Option<TemplateLang>,
    pub style_lang: Option<StyleLang>,
    pub scoped: bool,
    pub script_coffee: bool,
}

/// `lang="<lang>` or `lang='<lang>` anywhere in `contents` (prefix match).
pub fn is_lang(contents: &str, lang: &str) -> bool {
    ["\"", "'"]
        .iter()
        .any(|quote| contents.contains(&format!("lang={}{}", quote, lang)))
}

pub fn detect_document(contents: &str) -> Directives {
    let style_lang = if is_lang(contents, "sass") {
        Some(StyleLang::Sass)
    } else if is_lang(contents, "scss") {
        Some(StyleLang::Scss)
    } else {
        None
    };
    Directives {
        template_lang: is_lang(contents, "pug").then_some(TemplateLang::Pug),
        style_lang,
        scoped: RE_SCOPED_STYLE.is_match(contents),
        script_coffee: is_lang(contents, "coffee"),
    }
}

pub fn detect(fragment: &Fragment, mode: DirectiveMode) -> Directives {
    let legacy = detect_document(fragment.source());
    if mode == DirectiveMode::Document {
        return legacy;
    }

    let lang = |node: &Node| node.attr("lang").map(str::to_ascii_lowercase);

    let template_lang = match fragment.find("template", &[]) {
        Some(node) => (lang(node).as_deref() == Some("pug")).then_some(TemplateLang::Pug),
        None => legacy.template_lang,
    };
    let (style_lang, scoped) = match fragment.find("style", &[]) {
        Some(node) => {
            let style_lang = match lang(node).as_deref() {
                Some("sass") => Some(StyleLang::Sass),
                Some("scss") => Some(StyleLang::Scss),
                _ => None,
            };
            (style_lang, node.has_attr("scoped"))
        }
        None => (legacy.style_lang, legacy.scoped),
    };
    let script_coffee = match fragment.find("script", &[]) {
        Some(node) => lang(node).as_deref() == Some("coffee"),
        None => legacy.script_coffee,
    };

    Directives {
        template_lang,
        style_lang,
        scoped,
        script_coffee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_lang_quotes() {
        assert!(is_lang(r#"<style lang="sass">"#, "sass"));
        assert!(is_lang("<style lang='sass'>", "sass"));
        assert!(!is_lang("<style lang=sass>", "sass"));
    }

    #[test]
    fn test_document_prefers_sass() {
        let src = r#"<style lang="scss"></style><style lang="sass"></style>"#;
        assert_eq!(detect_document(src).style_lang, Some(StyleLang::Sass));
    }

    #[test]
    fn test_document_scoped() {
        assert!(detect_document("<style lang=\"sass\" scoped>\n</style>").scoped);
        assert!(!detect_document("<style>\n</style>").scoped);
        assert!(!detect_document("<style>\n.scoped {}\n</style>").scoped);
    }

    #[test]
    fn test_document_false_positive_in_content() {
        let src = "<template><p>lang=\"coffee\"</p></template><script>x = 1</script>";
        assert!(detect_document(src).script_coffee);
        let fragment = Fragment::parse(src);
        assert!(!detect(&fragment, DirectiveMode::Parsed).script_coffee);
        assert!(detect(&fragment, DirectiveMode::Document).script_coffee);
    }

    #[test]
    fn test_parsed_attributes() {
        let src = concat!(
            "<template lang=\"pug\">div</template>\n",
            "<script lang=\"coffee\">x = 1</script>\n",
            "<style lang=\"sass\" scoped>.a\n  b: c</style>\n",
        );
        let fragment = Fragment::parse(src);
        let directives = detect(&fragment, DirectiveMode::Parsed);
        assert_eq!(
            directives,
            Directives {
                template_lang: Some(TemplateLang::Pug),
                style_lang: Some(StyleLang::Sass),
                scoped: true,
                script_coffee: true,
            }
        );
    }

    #[test]
    fn test_parsed_falls_back_when_node_missing() {
        // No parseable style node, the scan still sees the declaration.
        let src = "<template></template><!-- <style lang=\"scss\" scoped> -->";
        let fragment = Fragment::parse(src);
        let directives = detect(&fragment, DirectiveMode::Parsed);
        assert_eq!(directives.style_lang, Some(StyleLang::Scss));
        assert!(directives.scoped);
    }

    #[test]
    fn test_deserialize_mode() {
        let mode: DirectiveMode = serde_json::from_str(r#""document""#).unwrap();
        assert_eq!(mode, DirectiveMode::Document);
    }
}
