//! `civic role`: switch the signed-in user's role.

use super::Ctx;
use crate::output::render;
use civic_core::model::{Role, User};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct RoleArgs {
    /// `citizen`, `staff` or `admin`.
    pub role: Role,
}

pub fn run_role(args: &RoleArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let mut store = ctx.open_store()?;
    store.switch_role(args.role);
    let user = store.session().to_user();
    render(ctx.output, &user, |u: &User, w: &mut dyn Write| {
        writeln!(w, "{} is now acting as {}", u.name, u.role.label())
    })
}
