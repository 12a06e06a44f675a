//! `civic lang`: show or set the interface language.

use super::Ctx;
use crate::output::render;
use civic_core::model::Language;
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct LangArgs {
    /// `en`, `hi` or `gu`. Omit to print the current language.
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
struct LangView {
    language: Language,
    name: &'static str,
    speech_locale: &'static str,
}

pub fn run_lang(args: &LangArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    if let Some(language) = args.language {
        store.set_language(language);
    }
    let language = store.language();
    let view = LangView {
        language,
        name: language.native_name(),
        speech_locale: language.speech_locale(),
    };
    render(ctx.output, &view, |v: &LangView, w: &mut dyn Write| {
        writeln!(w, "{} ({})", v.name, v.language)
    })
}
