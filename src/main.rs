use std::path::Path;
use std::process::exit;

use clap::{App, Arg};

use wayfarer::build::build_site;
use wayfarer::config::Config;

fn main() {
    env_logger::init();

    let matches = App::new("wayfarer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a blog from a headless CMS into a static site")
        .arg(
            Arg::with_name("project")
                .help("Project directory; searched upward for wayfarer.yaml")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .default_value("_output")
                .help("Directory to write the rendered site into"),
        )
        .arg(
            Arg::with_name("force")
                .long("force")
                .help("Rebuild even if the output is within the revalidation window"),
        )
        .get_matches();

    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let output = Path::new(matches.value_of("output").unwrap()); // has a default

    let config = match Config::from_directory(project, output) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    if let Err(e) = build_site(&config, matches.is_present("force")) {
        eprintln!("{}", e);
        exit(1);
    }
}
