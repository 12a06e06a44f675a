//! `civic login`: sign in as one of the directory users.

use super::Ctx;
use crate::output::{CliError, render, render_error};
use crate::session::known_user_ids;
use civic_core::ErrorCode;
use civic_core::model::User;
use civic_core::seed;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// User id, e.g. `user1`, `user2` or `admin1`.
    pub user_id: String,
}

pub fn run_login(args: &LoginArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let Some(user) = seed::user(&args.user_id) else {
        render_error(
            ctx.output,
            &CliError::with_details(
                format!("unknown user '{}'", args.user_id),
                format!("Known users: {}", known_user_ids()),
                ErrorCode::UserNotFound.code(),
            ),
        )?;
        anyhow::bail!("unknown user '{}'", args.user_id);
    };

    let mut store = ctx.open_store()?;
    store.set_current_user(user.clone());
    render(ctx.output, &user, |u: &User, w: &mut dyn Write| {
        writeln!(w, "Signed in as {} ({})", u.name, u.role.label())
    })
}
