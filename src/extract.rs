use crate::fragment::{Fragment, Node};

/// Stub substituted for a missing script block so type-checkers still see a module.
pub const EMPTY_EXPORT: &str = "// tslint:disable\nimport Vue from 'vue'\nexport default Vue\n";

#[derive(Debug, Clone, Default)]
pub struct BlockOptions<'a> {
    /// Accepted `lang` values; empty matches any node.
    pub langs: &'a [&'a str],
    /// Substitute [`EMPTY_EXPORT`] for an empty `script` block.
    pub empty_export: bool,
}

pub fn extract<'a>(source: &'a str, node: Option<&Node>) -> &'a str {
    let Some(node) = node else {
        return "";
    };
    let start = node.content_start();
    let end = node.location.end_tag.map_or(source.len(), |span| span.start);
    source.get(start..end).unwrap_or("")
}

/// First `tag` block of the fragment, or the empty string when none matches.
pub fn parse_block<'a>(fragment: &Fragment<'a>, tag: &str, options: &BlockOptions) -> &'a str {
    let source = fragment.source();
    let block = extract(source, fragment.find(tag, options.langs));
    if block.is_empty() && tag == "script" && options.empty_export {
        return EMPTY_EXPORT;
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    const SFC: &str = "<template>\n  <div>Hi</div>\n</template>\n<script>\nexport default {}\n</script>\n";

    #[test]
    fn test_extract_verbatim() {
        let fragment = Fragment::parse(SFC);
        let block = parse_block(&fragment, "template", &BlockOptions::default());
        assert_eq!(block, "\n  <div>Hi</div>\n");
        let script = parse_block(&fragment, "script", &BlockOptions::default());
        assert_eq!(script, "\nexport default {}\n");
    }

    #[test]
    fn test_missing_block_is_empty() {
        let fragment = Fragment::parse(SFC);
        assert_eq!(parse_block(&fragment, "style", &BlockOptions::default()), "");
        assert_eq!(extract(SFC, None), "");
    }

    #[test]
    fn test_empty_export_fallback() {
        let fragment = Fragment::parse("<template><p/></template>");
        let options = BlockOptions {
            empty_export: true,
            ..Default::default()
        };
        assert_eq!(parse_block(&fragment, "script", &options), EMPTY_EXPORT);
        // Only the script slot falls back.
        assert_eq!(parse_block(&fragment, "style", &options), "");
    }

    #[test]
    fn test_empty_script_tag_falls_back() {
        let fragment = Fragment::parse("<script></script>");
        let options = BlockOptions {
            empty_export: true,
            ..Default::default()
        };
        assert_eq!(parse_block(&fragment, "script", &options), EMPTY_EXPORT);
    }

    #[test]
    fn test_lang_filter() {
        let src = "<style>.a{}</style><style lang=\"sass\">.b\n  c: d</style>";
        let fragment = Fragment::parse(src);
        let options = BlockOptions {
            langs: &["sass"],
            ..Default::default()
        };
        assert_eq!(parse_block(&fragment, "style", &options), ".b\n  c: d");
    }

    #[test]
    fn test_unclosed_runs_to_end() {
        let src = "<template>\n<div>";
        let fragment = Fragment::parse(src);
        assert_eq!(parse_block(&fragment, "template", &BlockOptions::default()), "\n<div>");
    }
}
