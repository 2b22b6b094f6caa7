use clap::{Parser, Subcommand};
use mdsite::config::{self, SiteConfig};
use mdsite::pipeline::{self, BuildOptions};
use mdsite::render::MarkdownRenderer;
use mdsite::{output, scan, theme};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

#[derive(Parser)]
#[command(name = "mdsite")]
#[command(about = "Static site generator for a tree of markdown documents")]
#[command(long_about = "\
Static site generator for a tree of markdown documents

Every document becomes one page at the same relative location under html/,
every page carries a panel listing all pages, and index.html ties the set
together.

Input and output:

  md-input/                        site-output/
  ├── config.toml                  ├── index.html          # Home page
  ├── a.md              →          ├── html/a.html
  └── sub/                         ├── html/sub/b.html
      └── b.md          →          ├── style/styles.css    # Theme
                                   ├── favicon/favicon.ico
                                   └── js/index.js

Command-line flags override config.toml, which overrides the defaults.

Run 'mdsite gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory of documents
    #[arg(long, default_value = "md-input", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "site-output", global = true)]
    output: PathBuf,

    /// Extension of the documents to pick up (e.g. .md)
    #[arg(long, global = true)]
    ext: Option<String>,

    /// Theme installed as style/styles.css
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Directory searched for <theme>.css before the built-in themes
    #[arg(long, global = true)]
    theme_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site: scan, render every document, write the home page
    Build,
    /// List the documents a build would pick up
    Scan {
        /// Print the scan result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in themes
    Themes,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Build => {
            let config = resolve_config(&cli)?;
            let renderer = MarkdownRenderer::new(config.markdown.clone());
            let options = BuildOptions {
                source: cli.source.clone(),
                output: cli.output.clone(),
                config,
                generated_on: chrono::Local::now().date_naive(),
            };

            println!(
                "==> Building {} \u{2192} {}",
                cli.source.display(),
                cli.output.display()
            );
            let (tx, rx) = mpsc::channel();
            let printer = thread::spawn(move || {
                for event in rx {
                    output::print_build_event(&event);
                }
            });
            let result = pipeline::build_site(&options, &renderer, Some(&tx));
            drop(tx);
            printer.join().map_err(|_| "progress printer panicked")?;

            let summary = result?;
            println!(
                "==> Build complete: {} pages in {}",
                summary.pages.len(),
                summary.output.display()
            );
        }
        Command::Scan { json } => {
            let config = resolve_config(&cli)?;
            let tree = scan::scan(&cli.source, &config.extension)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                let pages = pipeline::plan_site(&tree.root, tree.documents.clone())?;
                output::print_scan_output(&tree.root, &pages);
            }
        }
        Command::Themes => {
            for line in output::format_themes(&theme::builtin_names(), theme::DEFAULT_THEME) {
                println!("{}", line);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `config.toml` from the source root and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<SiteConfig, Box<dyn Error>> {
    let mut config = config::load_config(&cli.source)?;
    if let Some(ext) = &cli.ext {
        config.extension = ext.clone();
    }
    if let Some(name) = &cli.theme {
        config.theme = name.clone();
    }
    if let Some(dir) = &cli.theme_dir {
        // Relative to the working directory, unlike the config file's value.
        config.theme_dir = Some(std::path::absolute(dir)?);
    }
    config.validate()?;
    Ok(config)
}
