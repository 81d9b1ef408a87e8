//! Runs one CLI command through the same forms and flows a page would use.

use std::path::Path;

use api::{Api, AuthContext, Session, TokenStore, Transport};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use forms::{Attachment, Form, password_strength};
use portal::flows;
use portal::route::resume_session;
use portal::{Effect, Effects, Notice, Role, WeekBoard, WeeksView, resolve_role};
use tracing::warn;

use crate::cli::Cmd;

fn fill(form: &mut Form, values: &[(&str, &str)]) {
    for (key, value) in values {
        form.update(*key, *value);
    }
}

fn notice_line(notice: &Notice) -> String {
    format!("[{}] {}", notice.level, notice.text)
}

/// One line per password requirement, ticked when met.
fn password_checklist(password: &str) -> Vec<String> {
    password_strength(password)
        .checklist()
        .into_iter()
        .map(|(check, met)| format!("[{}] {}", if met { "x" } else { " " }, check.label()))
        .collect()
}

/// Show which password requirements are still missing.
fn explain_password(form: &Form, password: &str) {
    if form.state().error("password").is_some() {
        for line in password_checklist(password) {
            eprintln!("    {line}");
        }
    }
}

/// Print effects on success, field and server errors otherwise.
fn finish(form: &Form, effects: Effects) -> Result<()> {
    for effect in &effects {
        match effect {
            Effect::Notify(notice) => println!("{}", notice_line(notice)),
            Effect::Navigate(route) => println!("-> {} ({})", route, route.path()),
        }
    }

    let mut failed = false;
    for field in &form.schema().fields {
        if let Some(err) = form.state().error(&field.key) {
            eprintln!("  {}: {}", field.label, err);
            failed = true;
        }
    }
    if let Some(message) = form.state().server_error() {
        eprintln!("{}", notice_line(&Notice::error(message)));
        failed = true;
    }
    if failed {
        bail!("{} was not submitted", form.schema().title);
    }
    Ok(())
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn receipt(path: &Path) -> Result<Attachment> {
    let bytes = std::fs::read(path)
        .wrap_err_with(|| format!("could not read receipt {}", path.display()))?;
    Ok(Attachment {
        field: "receipt".into(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt".into()),
        content_type: content_type(path).into(),
        bytes,
    })
}

async fn current_role<T: Transport>(api: &Api<T>, auth: &AuthContext) -> Role {
    match api.dashboard(auth).await {
        Ok(body) => resolve_role(&body),
        Err(e) => {
            warn!(error = %e, "could not resolve role");
            Role::Student
        }
    }
}

fn print_board(board: &WeekBoard) {
    if board.is_empty() {
        println!("No weeks to show.");
        return;
    }
    let active = board.active().map(|w| w.id.as_str());
    for week in board.weeks() {
        let marker = if Some(week.id.as_str()) == active { "*" } else { " " };
        println!(
            "{marker} week {:>2}  {:<20}  due {:>8.2}  penalty {:>7.2}  remaining {:>8.2}  [{}]",
            week.week_number,
            week.status,
            week.base_due,
            week.penalty_applied,
            week.amount_remaining,
            week.id
        );
    }
    println!(
        "total remaining {:.2}, penalties {:.2}",
        board.total_remaining(),
        board.total_penalties()
    );
}

pub async fn run<T: Transport, S: TokenStore>(
    cmd: Cmd,
    api: &Api<T>,
    session: &mut Session<S>,
) -> Result<()> {
    match cmd {
        Cmd::Login { email, password } => {
            let mut form = flows::login_form();
            fill(&mut form, &[("email", email.as_str()), ("password", password.as_str())]);
            let effects = flows::login(&mut form, api, session).await;
            finish(&form, effects)
        }
        Cmd::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let mut form = flows::register_form();
            fill(
                &mut form,
                &[
                    ("name", name.as_str()),
                    ("email", email.as_str()),
                    ("password", password.as_str()),
                    ("confirm_password", confirm_password.as_str()),
                ],
            );
            let effects = flows::register(&mut form, api, session).await;
            explain_password(&form, &password);
            finish(&form, effects)
        }
        Cmd::Logout => {
            for effect in flows::logout(session)? {
                if let Effect::Notify(notice) = effect {
                    println!("{}", notice_line(&notice));
                }
            }
            Ok(())
        }
        Cmd::Whoami => {
            let route = resume_session(api, session.context()).await;
            println!("{} ({})", route, route.path());
            Ok(())
        }
        Cmd::Weeks => {
            match flows::load_weeks(api, session.context()).await? {
                WeeksView::Loaded(board) => print_board(&board),
                WeeksView::NoGroupAssigned => println!(
                    "You are not in a group yet. Join one with `portal join --code <CODE>`."
                ),
            }
            Ok(())
        }
        Cmd::Pay {
            week,
            amount,
            reference,
            receipt: path,
        } => {
            let board = match flows::load_weeks(api, session.context()).await? {
                WeeksView::Loaded(board) => board,
                WeeksView::NoGroupAssigned => bail!("You are not in a group yet."),
            };
            let mut form = flows::payment_form();
            fill(
                &mut form,
                &[
                    ("amount", amount.as_str()),
                    ("reference_number", reference.as_str()),
                ],
            );
            if let Some(week) = &week {
                form.update("week_id", week.as_str());
            }
            form.attach(receipt(&path)?);
            let effects = flows::submit_payment(&mut form, api, session.context(), &board).await;
            finish(&form, effects)
        }
        Cmd::Loan { amount, reason } => {
            let mut form = flows::loan_form();
            fill(&mut form, &[("amount", amount.as_str()), ("reason", reason.as_str())]);
            let effects = flows::request_loan(&mut form, api, session.context()).await;
            finish(&form, effects)
        }
        Cmd::Due {
            title,
            amount,
            due_date,
            description,
        } => {
            let role = current_role(api, session.context()).await;
            let mut form = flows::due_form();
            fill(
                &mut form,
                &[
                    ("title", title.as_str()),
                    ("amount", amount.as_str()),
                    ("due_date", due_date.as_str()),
                    ("description", description.as_deref().unwrap_or("")),
                ],
            );
            let effects = flows::create_due(&mut form, api, session.context(), role).await;
            finish(&form, effects)
        }
        Cmd::Join { code } => {
            let mut form = flows::join_group_form();
            fill(&mut form, &[("group_code", code.as_str())]);
            let effects = flows::join_group(&mut form, api, session.context()).await;
            finish(&form, effects)
        }
        Cmd::ForgotPassword { email } => {
            let mut form = flows::forgot_password_form();
            fill(&mut form, &[("email", email.as_str())]);
            let effects = flows::forgot_password(&mut form, api).await;
            finish(&form, effects)
        }
        Cmd::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            let link = flows::verify_reset_link(api, &token).await;
            if let flows::ResetLink::Invalid(message) = link {
                bail!(message);
            }
            let mut form = flows::reset_password_form();
            fill(
                &mut form,
                &[
                    ("password", password.as_str()),
                    ("confirm_password", confirm_password.as_str()),
                ],
            );
            let effects = flows::reset_password(&mut form, api, &token).await;
            explain_password(&form, &password);
            finish(&form, effects)
        }
    }
}
