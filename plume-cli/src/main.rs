use clap::Command;

mod cmd;
mod config;

fn main() -> anyhow::Result<()> {
    let matches = Command::new("plume")
        .about("Build toolkit for documentation sites")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::assets::make_subcommand())
        .get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("assets", args)) => cmd::assets::execute(args),
        _ => unreachable!("subcommand required"),
    }
}
