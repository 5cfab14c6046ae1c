use serde::Deserialize;

use super::theme::{custom_css, resolve_font, Theme, FONTS};
use crate::config::UiConfig;
use crate::language::Language;
use crate::pipeline::RunReport;
use crate::utils::escape_html;

const TITLE: &str = "YouTube Subtitle Enhancer & Translator";

const INTRO: &str = "Enter a YouTube URL to fetch its subtitles. The app corrects the text for grammar \
and punctuation with a language model, then translates it into your chosen language.";

const BASE_CSS: &str = r#"
    * { box-sizing: border-box; }
    body { margin: 0; display: flex; min-height: 100vh; }
    .sidebar { width: 18rem; padding: 1.5rem; border-right: 1px solid rgba(128, 128, 128, 0.3); }
    .sidebar label { display: block; margin-top: 1rem; font-weight: 600; }
    .sidebar select { width: 100%; margin-top: 0.25rem; padding: 0.4rem; }
    main { flex: 1; padding: 2rem 3rem; max-width: 60rem; }
    .url-input { width: 100%; padding: 0.6rem; margin: 0.5rem 0 1rem; }
    button { padding: 0.5rem 1.5rem; cursor: pointer; }
    .error { background: #fdecea; color: #611a15; border-radius: 4px; padding: 0.75rem 1rem; margin: 1rem 0; }
    .panel { white-space: pre-wrap; line-height: 1.5; }
    #busy { display: none; margin-left: 1rem; }
    form.busy #busy { display: inline; }
"#;

/// Values submitted from the form. Omitted selections arrive empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub url: String,
    pub language: String,
    pub font: String,
    pub theme: String,
}

impl FormState {
    pub fn defaults(ui: &UiConfig) -> Self {
        Self {
            url: String::new(),
            language: ui.default_language.clone(),
            font: ui.default_font.clone(),
            theme: ui.default_theme.clone(),
        }
    }

    /// Fill any blank selection from the configured defaults
    pub fn or_defaults(mut self, ui: &UiConfig) -> Self {
        for (value, default) in [
            (&mut self.language, &ui.default_language),
            (&mut self.font, &ui.default_font),
            (&mut self.theme, &ui.default_theme),
        ] {
            if value.trim().is_empty() {
                *value = default.clone();
            }
        }
        self
    }
}


fn select(name: &str, label: &str, options: &[&str], selected: &str) -> String {
    let options: String = options
        .iter()
        .map(|option| {
            let marker = if *option == selected { " selected" } else { "" };
            let option = escape_html(option);
            format!(r#"<option value="{option}"{marker}>{option}</option>"#)
        })
        .collect();

    format!(r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select>"#)
}

/// Render the full page, with results when a run has completed
pub fn render_page(form: &FormState, report: Option<&RunReport>) -> String {
    let theme = Theme::from_label(&form.theme);
    let font = resolve_font(&form.font);
    let languages: Vec<&str> = Language::ALL.iter().map(|lang| lang.name()).collect();
    let themes: Vec<&str> = Theme::ALL.iter().map(|t| t.label()).collect();

    let sidebar = [
        "<h3>Customization Options</h3>".to_string(),
        select("font", "Choose a font", &FONTS, font),
        select("theme", "Choose a Theme", &themes, theme.label()),
        select("language", "Select target language", &languages, &form.language),
    ]
    .concat();

    let results = report.map(render_results).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{base_css}{custom_css}</style>
</head>
<body>
<form method="post" action="/process" onsubmit="this.classList.add('busy')" style="display: contents">
<aside class="sidebar">{sidebar}</aside>
<main>
<h1>{title}</h1>
<p>{intro}</p>
<label for="url">Enter YouTube Video URL</label>
<input class="url-input" id="url" name="url" type="text" value="{url}">
<button type="submit">Process</button><span id="busy">Processing...</span>
{results}
</main>
</form>
</body>
</html>
"#,
        title = escape_html(TITLE),
        base_css = BASE_CSS,
        custom_css = custom_css(font, theme),
        intro = escape_html(INTRO),
        url = escape_html(&form.url),
    )
}

fn render_results(report: &RunReport) -> String {
    let notices: String = report
        .notices
        .iter()
        .map(|notice| format!(r#"<div class="error">{}</div>"#, escape_html(&notice.message)))
        .collect();

    let panels: String = report
        .panels()
        .iter()
        .map(|panel| {
            format!(
                r#"<section><h2>{}</h2><div class="panel">{}</div></section>"#,
                escape_html(&panel.title),
                escape_html(&panel.body)
            )
        })
        .collect();

    format!("{}{}", notices, panels)
}
