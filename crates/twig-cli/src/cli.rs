use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "twig")]
#[command(bin_name = "twig")]
#[command(version)]
#[command(about = "Confirm and carry out git branch deletions")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Write a diagnostics log under ~/.config/twig/diagnostics"
    )]
    pub diagnostics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Show what deleting a branch would involve")]
    Inspect {
        #[arg(help = "Local branch name")]
        branch: String,
    },
    #[command(about = "Delete a branch, offering to merge unmerged commits first")]
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(help = "Local branch name")]
    pub branch: String,

    #[arg(long, help = "Confirm without opening the dialog")]
    pub yes: bool,

    #[arg(
        long,
        requires = "yes",
        help = "Also delete the branch on its remote when confirming with --yes"
    )]
    pub include_remote: bool,
}
