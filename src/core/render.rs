//! Page renderer
//!
//! Produces the wrapper document around the target application. Whatever
//! the strategy, the document carries a visible link to the target, because
//! the target may refuse to be framed and that refusal is invisible to us.
//!
//! Two strategies:
//! - `FrameEmbed`: a full-width frame sourced at the target, a divider, the
//!   fallback button (new tab) and an optional caption
//! - `AutoRedirect`: no frame; an inline script navigates the top window to
//!   the target, a meta refresh does the same if the script is not allowed
//!   to, and the fallback link (whole window) stays visible meanwhile

use tracing::debug;

use super::escape::{escape_html, js_string_literal};
use crate::models::{Dimensions, PageChrome, RenderedPage, Strategy, TargetReference};
use crate::utils::constants::{DEFAULT_PAGE_LANG, MOBILE_BREAKPOINT_PX};

/// Fluent renderer configuration
#[derive(Debug, Clone)]
pub struct PageBuilder {
    target: TargetReference,
    strategy: Strategy,
    dimensions: Dimensions,
    chrome: PageChrome,
}

impl PageBuilder {
    pub fn new(target: TargetReference) -> Self {
        Self {
            target,
            strategy: Strategy::default(),
            dimensions: Dimensions::default(),
            chrome: PageChrome::default(),
        }
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn chrome(mut self, chrome: PageChrome) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn caption(mut self, caption: Option<String>) -> Self {
        self.chrome.caption = caption;
        self
    }

    pub fn build(self) -> RenderedPage {
        render_page(&self.target, self.strategy, self.dimensions, &self.chrome)
    }
}

/// Render the wrapper page for `target`
pub fn render_page(
    target: &TargetReference,
    strategy: Strategy,
    dimensions: Dimensions,
    chrome: &PageChrome,
) -> RenderedPage {
    let url = target.as_str().to_string();

    let page = match strategy {
        Strategy::FrameEmbed => RenderedPage {
            html: frame_document(&url, dimensions, chrome),
            target: target.clone(),
            strategy,
            fallback_href: url.clone(),
            embed_src: Some(url),
            refresh_target: None,
            script_target: None,
            embed_height: dimensions.height,
        },
        Strategy::AutoRedirect => RenderedPage {
            html: redirect_document(&url, chrome),
            target: target.clone(),
            strategy,
            fallback_href: url.clone(),
            embed_src: None,
            refresh_target: Some(url.clone()),
            script_target: Some(url),
            embed_height: 0,
        },
    };

    debug!(
        strategy = %page.strategy,
        bytes = page.html.len(),
        "Page rendered"
    );
    page
}

fn page_style() -> String {
    format!(
        r#"
      body {{ margin: 0; font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif; }}
      .main > div {{ padding-top: 0rem; padding-bottom: 0rem; }}
      .main {{ padding: 0 1rem 1rem; }}
      .embed-container {{ width: 100%; overflow: hidden; }}
      .embed-container iframe {{ display: block; border: 0; max-width: 100%; }}
      hr {{ border: 0; border-top: 1px solid #e6e6e6; margin: 1rem 0; }}
      .button {{ display: inline-block; padding: 0.5rem 1rem; border-radius: 0.5rem; text-decoration: none; }}
      .button.primary {{ background: #ff4b4b; color: #ffffff; }}
      .caption {{ color: #808495; font-size: 0.875rem; }}
      @media (max-width: {bp}px) {{
        .main {{ padding: 0; }}
      }}
    "#,
        bp = MOBILE_BREAKPOINT_PX
    )
}

/// Inline SVG favicon drawing `icon`, percent-encoded into a data URI
fn favicon_href(icon: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>{}</text></svg>",
        escape_html(icon)
    );
    // form encoding writes spaces as '+'; a literal '+' is already %2B
    let encoded: String = url::form_urlencoded::byte_serialize(svg.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("data:image/svg+xml,{}", encoded)
}

fn document_head(chrome: &PageChrome, extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
{extra}  <title>{title}</title>
  <link rel="icon" href="{icon}">
  <style>{style}</style>
</head>
"#,
        lang = DEFAULT_PAGE_LANG,
        extra = extra,
        title = escape_html(&chrome.title),
        icon = escape_html(&favicon_href(&chrome.icon)),
        style = page_style(),
    )
}

fn caption_block(chrome: &PageChrome) -> String {
    match &chrome.caption {
        Some(text) => format!("    <p class=\"caption\">{}</p>\n", escape_html(text)),
        None => String::new(),
    }
}

fn frame_document(url: &str, dimensions: Dimensions, chrome: &PageChrome) -> String {
    let href = escape_html(url);
    let mut html = document_head(chrome, "");
    html.push_str(&format!(
        r#"<body>
  <main class="main">
    <div class="embed-container" style="height: {height}px;">
      <iframe src="{href}" title="{title}" height="{height}" width="{width}" scrolling="yes" loading="eager"></iframe>
    </div>
    <hr>
    <a class="button primary" href="{href}" target="_blank" rel="noopener noreferrer">{label}</a>
"#,
        href = href,
        title = escape_html(&chrome.title),
        height = dimensions.height,
        width = dimensions.width_attr(),
        label = escape_html(&chrome.button_label),
    ));
    html.push_str(&caption_block(chrome));
    html.push_str("  </main>\n</body>\n</html>\n");
    html
}

fn redirect_document(url: &str, chrome: &PageChrome) -> String {
    let href = escape_html(url);
    let refresh = format!(
        "  <meta http-equiv=\"refresh\" content=\"0; url={}\">\n",
        href
    );
    let mut html = document_head(chrome, &refresh);
    html.push_str(&format!(
        r#"<body>
  <main class="main">
    <script>
      (function () {{
        var target = {js_target};
        try {{
          window.top.location.href = target;
        }} catch (e) {{
          window.location.href = target;
        }}
      }})();
    </script>
    <a class="button primary" href="{href}" target="_top">{label}</a>
"#,
        js_target = js_string_literal(url),
        href = href,
        label = escape_html(&chrome.redirect_label),
    ));
    html.push_str(&caption_block(chrome));
    html.push_str("  </main>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_page_structure() {
        let page = PageBuilder::new(TargetReference::default()).build();
        assert_eq!(page.strategy, Strategy::FrameEmbed);
        assert!(page.html.starts_with("<!DOCTYPE html>"));
        assert!(page.html.contains("<title>ElectroSpot</title>"));
        assert!(page.html.contains(r#"height="800" width="100%""#));
        assert!(page.html.contains("<hr>"));
        assert!(page.html.contains("Abrir ElectroSpot em nova aba"));
        assert!(page.html.contains(r#"<p class="caption">"#));
        assert!(!page.html.contains("http-equiv"));
        assert!(!page.html.contains("<script>"));
    }

    #[test]
    fn test_redirect_page_structure() {
        let page = PageBuilder::new(TargetReference::default())
            .strategy(Strategy::AutoRedirect)
            .build();
        assert_eq!(page.embed_height, 0);
        assert!(page.embed_src.is_none());
        assert!(!page.html.contains("<iframe"));
        assert!(page
            .html
            .contains(r#"<meta http-equiv="refresh" content="0; url=https://electrospot.lovable.app">"#));
        assert!(page.html.contains(r#"var target = "https://electrospot.lovable.app";"#));
        assert!(page.html.contains("window.top.location.href = target;"));
        assert!(page.html.contains(r#"target="_top">Abrir ElectroSpot</a>"#));
    }

    #[test]
    fn test_caption_can_be_omitted() {
        let page = PageBuilder::new(TargetReference::default())
            .caption(None)
            .build();
        assert!(!page.html.contains("class=\"caption\""));
    }

    #[test]
    fn test_fixed_width_frame() {
        let page = PageBuilder::new(TargetReference::default())
            .dimensions(Dimensions::new(700, Some(1024)).unwrap())
            .build();
        assert!(page.html.contains(r#"height="700" width="1024""#));
        assert!(page.html.contains("height: 700px;"));
    }

    #[test]
    fn test_chrome_text_is_escaped() {
        let chrome = PageChrome {
            title: "A <b>title</b>".to_string(),
            ..PageChrome::default()
        };
        let page = PageBuilder::new(TargetReference::default())
            .chrome(chrome)
            .build();
        assert!(page.html.contains("<title>A &lt;b&gt;title&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_favicon_is_percent_encoded() {
        let href = favicon_href("#%");
        assert!(href.starts_with("data:image/svg+xml,%3Csvg%20xmlns%3D"));
        assert!(href.contains("%23%25"));
        let payload = &href["data:image/svg+xml,".len()..];
        for raw in ['<', '>', '#', ' ', '\'', '"'] {
            assert!(!payload.contains(raw), "raw {:?} in {}", raw, href);
        }

        // Non-ASCII icons survive as UTF-8 escapes
        assert!(favicon_href("⚡").contains("%E2%9A%A1"));
    }

    #[test]
    fn test_custom_redirect_label() {
        let chrome = PageChrome {
            redirect_label: "Ir para o ElectroSpot".to_string(),
            ..PageChrome::default()
        };
        let page = PageBuilder::new(TargetReference::default())
            .strategy(Strategy::AutoRedirect)
            .chrome(chrome)
            .build();
        assert!(page.html.contains(r#"target="_top">Ir para o ElectroSpot</a>"#));
        assert!(!page.html.contains(">Abrir ElectroSpot</a>"));
    }
}
