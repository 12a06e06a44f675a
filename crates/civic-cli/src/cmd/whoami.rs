//! `civic whoami`: the acting user, role and language.

use super::Ctx;
use crate::output::{pretty_kv, render_mode};
use civic_core::model::{Language, Role, User};
use civic_core::view::ViewScope;
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

#[derive(Debug, Serialize)]
pub struct Whoami {
    pub user: User,
    pub role_label: &'static str,
    pub language: Language,
    pub tabs: [ViewScope; 2],
    pub can_change_status: bool,
    pub can_view_analytics: bool,
}

pub fn run_whoami(_args: &WhoamiArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.session(&store)?;
    let role: Role = session.role();
    let whoami = Whoami {
        user: session.to_user(),
        role_label: role.label(),
        language: store.language(),
        tabs: ViewScope::available_for(role),
        can_change_status: session.can_change_status(),
        can_view_analytics: session.can_view_analytics(),
    };
    render_mode(
        ctx.output,
        &whoami,
        |w: &Whoami, out: &mut dyn Write| {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                w.user.id, w.user.name, w.user.role, w.language
            )
        },
        |w: &Whoami, out: &mut dyn Write| {
            pretty_kv(out, "user", format!("{} ({})", w.user.name, w.user.id))?;
            pretty_kv(out, "email", &w.user.email)?;
            pretty_kv(out, "role", w.role_label)?;
            if let Some(ref dept) = w.user.department {
                pretty_kv(out, "department", dept)?;
            }
            pretty_kv(
                out,
                "language",
                format!("{} ({})", w.language.native_name(), w.language),
            )
        },
    )
}
