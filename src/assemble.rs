use crate::directive::{StyleLang, TemplateLang};

fn open_tag(name: &str, attrs: &[String]) -> String {
    if attrs.is_empty() {
        format!("<{}>", name)
    } else {
        format!("<{} {}>", name, attrs.join(" "))
    }
}

fn push_block(out: &mut String, open: &str, name: &str, block: &str) {
    out.push_str(open);
    out.push('\n');
    out.push_str(block);
    out.push('\n');
    out.push_str(&format!("</{}>\n", name));
}

/// The script tag never carries a `lang`.
pub fn assemble(
    template: &str,
    script: &str,
    style: &str,
    template_lang: Option<TemplateLang>,
    style_lang: Option<StyleLang>,
    scoped: bool,
) -> String {
    let template_attrs: Vec<String> = template_lang
        .map(|lang| format!("lang=\"{}\"", lang))
        .into_iter()
        .collect();
    let mut style_attrs: Vec<String> = style_lang
        .map(|lang| format!("lang=\"{}\"", lang))
        .into_iter()
        .collect();
    if scoped {
        style_attrs.push("scoped".to_string());
    }

    let mut out = String::new();
    push_block(&mut out, &open_tag("template", &template_attrs), "template", template);
    out.push('\n');
    push_block(&mut out, &open_tag("script", &[]), "script", script);
    out.push('\n');
    push_block(&mut out, &open_tag("style", &style_attrs), "style", style);
    out
}
