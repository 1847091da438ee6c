// dirsync CLI entry point

use clap::Parser;
use dirsync_cli::{exit_code, init_logging, output, Cli, CommandRouter, OutputStyle};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_level.as_deref()) {
        output::print_error(&e.user_message());
        std::process::exit(dirsync_cli::EXIT_ERROR);
    }

    let result = CommandRouter::route(&cli).await;
    let code = exit_code(&result);

    match result {
        Ok(run) => match output::render_result(&run, cli.format, &OutputStyle::default()) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                output::print_error(&e.user_message());
                std::process::exit(dirsync_cli::EXIT_ERROR);
            }
        },
        Err(e) => {
            output::print_error(&e.user_message());
            if cli.verbose {
                eprintln!("{}", e.technical_details());
            }
        }
    }

    std::process::exit(code);
}
