//! tasklog sign-in commands
//!
//! login, register, login-google, logout and whoami. The signed-in user is
//! written to the session file so later invocations pick it up.

use serde::Serialize;

use super::Context;
use crate::auth::{Auth, Provider, User};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::session;

#[derive(Serialize)]
struct SignInReport<'a> {
    user: &'a User,
    mock_backend: bool,
}

#[derive(Serialize)]
struct LogoutReport {
    signed_out: bool,
}

#[derive(Serialize)]
struct WhoamiReport {
    signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

fn report_sign_in(ctx: &Context, command: &str, header: &str, user: &User, mock: bool) -> Result<()> {
    session::save(&ctx.home, user)?;

    let mut human = HumanOutput::new(format!("{header}: {}", user.label()));
    human.push_summary("uid", user.uid.clone());
    human.push_summary("email", user.email.clone());
    human.push_summary("provider", user.provider.clone());
    if mock {
        human.push_warning("mock backend: data lasts for a single command");
    }
    human.push_next_step("tasklog add \"<title>\" --time <hours>");
    human.push_next_step("tasklog list");

    emit_success(
        ctx.output,
        command,
        &SignInReport {
            user,
            mock_backend: mock,
        },
        Some(&human),
    )
}

pub fn run_login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let auth = Auth::new(store.as_ref());
    let user = auth.sign_in_with_password(email, password)?;
    report_sign_in(ctx, "login", "Login successful", &user, store.is_mock())
}

pub fn run_register(ctx: &Context, email: &str, password: &str, confirm: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let auth = Auth::new(store.as_ref());
    let user = auth.create_user(email, password, confirm)?;
    report_sign_in(ctx, "register", "Account created", &user, store.is_mock())
}

pub fn run_login_google(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let auth = Auth::new(store.as_ref());
    let user = auth.sign_in_with_provider(Provider::Google)?;
    report_sign_in(ctx, "login-google", "Signed in with Google", &user, store.is_mock())
}

pub fn run_logout(ctx: &Context) -> Result<()> {
    let signed_out = session::clear(&ctx.home)?;

    let header = if signed_out {
        "Logged out"
    } else {
        "Not signed in"
    };
    let mut human = HumanOutput::new(header);
    human.push_next_step("tasklog login --email <email> --password <password>");

    emit_success(ctx.output, "logout", &LogoutReport { signed_out }, Some(&human))
}

pub fn run_whoami(ctx: &Context) -> Result<()> {
    let user = session::load(&ctx.home).map(|session| session.user);

    let mut human = match &user {
        Some(user) => {
            let mut human = HumanOutput::new(format!("Signed in as {}", user.label()));
            human.push_summary("uid", user.uid.clone());
            human.push_summary("email", user.email.clone());
            human.push_summary("provider", user.provider.clone());
            human
        }
        None => HumanOutput::new("Not signed in"),
    };
    if user.is_none() {
        human.push_next_step("tasklog login --email <email> --password <password>");
    }

    emit_success(
        ctx.output,
        "whoami",
        &WhoamiReport {
            signed_in: user.is_some(),
            user,
        },
        Some(&human),
    )
}
