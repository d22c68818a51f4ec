use clap::{Parser, Subcommand};
use monad::{config, generate, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "monad")]
#[command(about = "Static site template compositor with a build-time audit")]
#[command(long_about = "\
Static site template compositor with a build-time audit

Pages are plain HTML or Markdown files. Fragments are included with
<% name %>, values are interpolated with {{site.title}}, and layouts
receive page content through {{slot:main}} placeholders. Every built
page is audited for SEO, accessibility and broken internal links.

Project structure:

  my-site/
  ├── monad.toml                   # Project config (optional)
  ├── pages/
  │   ├── index.html               # → /
  │   ├── about.md                 # → /about/
  │   └── blog/index.html          # → /blog/
  ├── fragments/
  │   ├── _nav.html                # <% nav %>
  │   ├── blog/_card.html          # <% blog/card, { title: \"...\" } %>
  │   └── layouts/_default.html    # default layout
  ├── public/                      # copied verbatim to the output root
  └── data/collections.json        # loop data (when enabled)

Audit results are written to <output>/_audit/report.json and report.html.

Run 'monad gen-config' to generate a documented monad.toml.")]
#[command(version)]
struct Cli {
    /// Project root holding monad.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every page, audit the output and write reports
    Build,
    /// Render a single page by URL and print it to stdout
    Render {
        /// Route to render, e.g. /about/
        url: String,
    },
    /// List every route and the source file that produces it
    Routes,
    /// Print a stock monad.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.root)?;
            println!("==> Building {}", cli.root.display());
            match generate::build(&cli.root, &config) {
                Ok(summary) => {
                    output::print_build_output(&summary);
                    if summary.report.total() > 0 {
                        println!();
                        output::print_report_table(&summary.report);
                    }
                }
                Err(err) => {
                    if let generate::BuildError::AuditFailed { summary, .. } = &err {
                        output::print_build_output(summary);
                        println!();
                        output::print_report_table(&summary.report);
                    }
                    return Err(err.into());
                }
            }
        }
        Command::Render { url } => {
            let config = config::load_config(&cli.root)?;
            match generate::render_url(&cli.root, &config, &url)? {
                Some(html) => print!("{html}"),
                None => return Err(format!("no page is routed at {url}").into()),
            }
        }
        Command::Routes => {
            let config = config::load_config(&cli.root)?;
            let plan = generate::plan(&cli.root, &config)?;
            output::print_routes(&plan.routes);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
