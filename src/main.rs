use clap::{Parser, Subcommand};

mod cli;

use cli::pack::{cmd_pack, PackArgs};
use cli::unflatten::{cmd_unflatten, UnflattenArgs};

#[derive(Parser)]
#[command(
    name = "texpack",
    version,
    about = "Pack neural-network weights for RGBA texture storage"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Repack rank-4 weight tensors into the RGBA texel layout
    Pack(PackArgs),
    /// Expand a flat dotted-key dictionary into a nested tree
    Unflatten(UnflattenArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Pack(args) => cmd_pack(args),
        Command::Unflatten(args) => cmd_unflatten(args),
    }
}
