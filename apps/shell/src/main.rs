use clap::Parser;
use mxp_shell::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    mxp_shell::run(cli, &mut stdout.lock())
}
