//! `astlens languages` command implementation.

use colored::Colorize;
use serde::Serialize;

use astlens::{EditorSettings, Language};

use super::output::{print_json, OutputConfig};

/// One registered adapter, as listed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageInfo {
    name: &'static str,
    editor_language: &'static str,
    kind_key: &'static str,
    extensions: &'static [&'static str],
    editor_settings: EditorSettings,
}

fn registry() -> Vec<LanguageInfo> {
    Language::ALL
        .iter()
        .map(|lang| {
            let adapter = lang.adapter();
            LanguageInfo {
                name: adapter.name(),
                editor_language: adapter.editor_language(),
                kind_key: adapter.kind_key(),
                extensions: lang.extensions(),
                editor_settings: adapter.editor_settings(),
            }
        })
        .collect()
}

/// Run the languages command.
pub fn run(json: bool) -> astlens::Result<()> {
    let languages = registry();
    if json {
        return print_json(&languages);
    }

    let config = OutputConfig::from_env();
    for info in &languages {
        let on_off = |enabled: bool| if enabled { "on" } else { "off" };
        println!(
            "{} {}",
            config.paint(info.name, |s| s.cyan().bold()),
            config.paint(&format!("(.{})", info.extensions.join(", .")), |s| s.dimmed())
        );
        println!("  {}: {}", config.paint("editor language", |s| s.dimmed()), info.editor_language);
        println!("  {}: {}", config.paint("kind key", |s| s.dimmed()), info.kind_key);
        println!(
            "  {}: semantic {}, syntax {}",
            config.paint("diagnostics", |s| s.dimmed()),
            on_off(info.editor_settings.semantic_validation),
            on_off(info.editor_settings.syntax_validation)
        );
    }
    Ok(())
}
