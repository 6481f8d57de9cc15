use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use edn_reader::{diagnostic::Diagnostic, Error, Reader, ValueNode};

#[derive(Parser)]
#[command(name = "edn-check")]
#[command(about = "Check that EDN files parse")]
struct Cli {
    /// Files or directories; directories are searched for `*.edn` files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Maximum nesting depth of forms
    #[arg(long, default_value_t = edn_reader::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print the parsed forms
    #[arg(long)]
    print: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

fn check(reader: &Reader, path: &Path) -> Result<Vec<ValueNode>, Error> {
    if path.is_dir() {
        reader.parse_dir(path)
    } else {
        reader.parse_file(path)
    }
}

fn report(err: &Error, color: bool) {
    let source = err.path().and_then(|path| fs::read_to_string(path).ok());

    match (err.position(), err.path(), source) {
        (Some(_), Some(path), Some(source)) => {
            Diagnostic::from_error(err).show(&source, &path.display().to_string(), color)
        }
        _ => eprintln!("error: {}", err),
    }
}

/// `RUST_LOG` when set, otherwise INFO for this crate and the library
fn log_filter(directives: Option<String>) -> EnvFilter {
    match directives {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new("edn_reader=info,edn_check=info"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reader = Reader::new().max_depth(cli.max_depth);
    debug!(max_depth = cli.max_depth, paths = cli.paths.len(), "checking");

    let mut failed = 0;
    for path in &cli.paths {
        match check(&reader, path) {
            Ok(forms) => {
                if cli.print {
                    for form in &forms {
                        println!("{:#?}", form);
                    }
                }
                info!(path = %path.display(), forms = forms.len(), "ok");
            }
            Err(err) => {
                failed += 1;
                report(&err, !cli.no_color);
            }
        }
    }

    if failed > 0 {
        eprintln!("{} of {} paths failed to parse", failed, cli.paths.len());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_respects_rust_log() {
        let filter = log_filter(Some("edn_reader=trace".to_owned())).to_string();
        assert!(filter.contains("edn_reader=trace"), "{}", filter);
        assert!(!filter.contains("info"), "{}", filter);

        let default = log_filter(None).to_string();
        assert!(default.contains("edn_reader=info"), "{}", default);
        assert!(default.contains("edn_check=info"), "{}", default);
    }
}
