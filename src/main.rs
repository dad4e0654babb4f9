use clap::Parser;
use todos::cli::{Cli, resolve_store_path};
use todos::ui::{App, RenderConfig, Term};

fn main() {
    let cli = Cli::parse();

    let path = match resolve_store_path(&cli.file) {
        Ok(path) => path,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
    };

    let mut app = match App::load(path) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    if cli.demo {
        app.seed_demo();
    }

    let config = RenderConfig {
        ascii: cli.ascii,
        colors: !cli.no_colors,
    };
    let mut term = Term::stdio(config);
    if let Err(e) = app.run(&mut term) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
