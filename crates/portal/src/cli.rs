use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portal", version, about = "Thesis group contributions portal")]
pub struct Cli {
    /// Backend base URL, overrides the settings file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "THESIS_LEDGER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "THESIS_LEDGER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show where the stored session lands
    Whoami,
    /// List payable weeks
    Weeks,
    /// Pay a week (defaults to the first late, else first unpaid week)
    Pay {
        #[arg(long)]
        week: Option<String>,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        reference: String,
        #[arg(long)]
        receipt: PathBuf,
    },
    /// Request a loan
    Loan {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        reason: String,
    },
    /// Create a due (treasurers only)
    Due {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        due_date: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Join a group by code
    Join {
        #[arg(long)]
        code: String,
    },
    /// Request a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password from a reset link token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "THESIS_LEDGER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
}
