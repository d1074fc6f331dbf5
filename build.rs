use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const LOCALES_DIR: &str = "locales";
const FALLBACK_DEFAULT_LOCALE: &str = "en";

fn main() {
    println!("cargo:rerun-if-changed={LOCALES_DIR}");
    println!("cargo:rerun-if-env-changed=EASYDIALOGS_DEFAULT_LOCALE");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let locales = load_locales(&manifest_dir.join(LOCALES_DIR));
    let default_locale = env::var("EASYDIALOGS_DEFAULT_LOCALE")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_DEFAULT_LOCALE.to_string());

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo always sets OUT_DIR"));
    let target = out_dir.join("easydialogs_i18n_generated.rs");
    fs::write(&target, render(&default_locale, &locales))
        .unwrap_or_else(|error| panic!("failed to write {}: {error}", target.display()));
}

fn load_locales(dir: &Path) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut locales = BTreeMap::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return locales;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let Some(tag) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        println!("cargo:rerun-if-changed={}", path.display());

        let source = fs::read_to_string(&path)
            .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()));
        let table = toml::from_str::<toml::Table>(&source)
            .unwrap_or_else(|error| panic!("invalid locale file {}: {error}", path.display()));

        let mut messages = BTreeMap::new();
        flatten("", &table, &mut messages);
        locales.insert(tag.to_string(), messages);
    }
    locales
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(full_key, text.clone());
            }
            toml::Value::Table(nested) => flatten(&full_key, nested, out),
            other => panic!("locale key `{full_key}` must be a string, found {other}"),
        }
    }
}

fn render(default_locale: &str, locales: &BTreeMap<String, BTreeMap<String, String>>) -> String {
    let mut code = String::new();
    let _ = writeln!(code, "pub const DEFAULT_LOCALE: &str = {default_locale:?};");
    let _ = writeln!(
        code,
        "pub static LOCALES: &[(&str, &[(&str, &str)])] = &["
    );
    for (tag, messages) in locales {
        let _ = writeln!(code, "    ({tag:?}, &[");
        for (key, text) in messages {
            let _ = writeln!(code, "        ({key:?}, {text:?}),");
        }
        let _ = writeln!(code, "    ]),");
    }
    let _ = writeln!(code, "];");
    code
}
