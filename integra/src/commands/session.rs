use integra::routing::HistoryRouter;
use integra::stop_flag;
use integra::SharedAuthContext;
use integra_core::authorization::Guarded;
use integra_core::routing::Navigator;
use integra_types::{RouteDecision, User};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::cli::{AccessCommand, LoginCommand, WatchCommand};

fn print_user(user: &User) {
    let mut builder = Builder::default();
    builder.push_record(vec!["Name", user.display_name.as_str()]);
    builder.push_record(vec!["Email", user.email.as_str()]);
    builder.push_record(vec!["Role", user.role.label()]);
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
}

fn print_navigation(ctx: &SharedAuthContext) {
    let items = ctx.navigation();
    if items.is_empty() {
        return;
    }
    println!("{}", "Navigation:".bold());
    for item in items {
        println!("  {:<14} {}", item.label, item.path.dimmed());
    }
}

fn describe(decision: &RouteDecision) -> String {
    match decision {
        RouteDecision::Wait => "waiting for the session check".yellow().to_string(),
        RouteDecision::Render => "render".green().to_string(),
        RouteDecision::Redirect { to, .. } => format!("redirect to {}", to).yellow().to_string(),
    }
}

pub async fn login(ctx: &SharedAuthContext, cmd: &LoginCommand) -> anyhow::Result<()> {
    match ctx.login(&cmd.email, &cmd.password).await {
        Ok(user) => {
            println!("{} Signed in", "✓".green());
            print_user(&user);
            print_navigation(ctx);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e.user_message())),
    }
}

pub async fn logout(ctx: &SharedAuthContext) -> anyhow::Result<()> {
    if let Some(revocation) = ctx.logout() {
        revocation.await?;
    }
    println!("{} Signed out", "✓".green());
    Ok(())
}

pub async fn whoami(ctx: &SharedAuthContext) -> anyhow::Result<()> {
    let session = ctx.session.check_session().await;
    match session.identity {
        Some(user) => {
            print_user(&user);
            print_navigation(ctx);
        }
        None => println!("{}", "Not signed in".yellow()),
    }
    Ok(())
}

pub async fn access(ctx: &SharedAuthContext, cmd: &AccessCommand) -> anyhow::Result<()> {
    ctx.session.check_session().await;

    let decision = ctx.route_decision(&cmd.path);
    println!("{}: {}", cmd.path.bold(), describe(&decision));
    if !decision.renders_children() {
        return Ok(());
    }

    match ctx.guard_page(&cmd.path, || ()) {
        Guarded::Content(()) => println!("{} page content is shown", "✓".green()),
        Guarded::Fallback(()) => println!("fallback content is shown"),
        Guarded::Denied(denied) => println!("{} {}", "✗".red(), denied.notice()),
    }
    Ok(())
}

pub async fn watch(ctx: &SharedAuthContext, cmd: &WatchCommand) -> anyhow::Result<()> {
    stop_flag::register_signal_handler(&ctx.stop_flag);

    let session = ctx.start().await;
    info!("Initial session status: {:?}", session.status());

    let router = Arc::new(HistoryRouter::new(&cmd.path));
    let mut decisions = ctx.attach_router(router.clone(), router.subscribe());

    loop {
        tokio::select! {
            changed = decisions.changed() => {
                if changed.is_err() {
                    break;
                }
                let decision = decisions.borrow_and_update().clone();
                println!("{}: {}", router.current_path().bold(), describe(&decision));
            }
            _ = ctx.stop_flag.wait() => break,
        }
    }

    ctx.shutdown().await;
    Ok(())
}
