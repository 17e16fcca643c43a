use clap::{Parser, Subcommand};
use headless_press::fetch::ContentClient;
use headless_press::photos::{ImageSource, NoImages, PhotoSearch};
use headless_press::site::{self, Manifest};
use headless_press::{config, generate, logging, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "headless-press")]
#[command(about = "Static site generator for headless CMS article collections")]
#[command(long_about = "\
Static site generator for headless CMS article collections

One CMS collection holds the articles of many sites. Each record names its
site in `Domain` and its path in `urlSlug`; the record with slug `/` is the
home page. headless-press builds the site of one domain:

  dist/
  ├── index.html                   # Home record + related-article grid
  ├── natural-cleaning/index.html  # One page per article record
  ├── sitemap/index.html           # Human-readable sitemap
  ├── sitemap.xml                  # Sitemap for crawlers
  └── 404.html

Record fields used:
  Title, H1, MetaTitle, MetaDescription   headings and page head
  Paragraph, Markdown                     lead paragraph and body
  containerStyles, headerStyles,
  bodyStyles, paragraphStyles             inline region styles
  CanonicalURL, Schema                    canonical link and JSON-LD
  imgkeywords                             stock-photo search terms

Secrets can come from the environment instead of config.toml:
  HEADLESS_PRESS_API_TOKEN, HEADLESS_PRESS_PHOTOS_ACCESS_KEY

Run 'headless-press gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".headless-press-temp", global = true)]
    temp_dir: PathBuf,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the domain's records and site chrome into a manifest
    Fetch,
    /// Produce the HTML site from a fetched manifest
    Generate,
    /// Run the full pipeline: fetch → generate
    Build,
    /// Fetch content and list what a build would write, without writing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let manifest_path = cli.temp_dir.join("manifest.json");

    match cli.command {
        Command::Fetch => {
            let site_config = config::load_config(&cli.config)?;
            let http = reqwest::Client::new();
            let manifest = fetch(&http, &site_config).await;
            write_manifest(&manifest, &cli.temp_dir, &manifest_path)?;
            output::print_fetch_output(&manifest);
        }
        Command::Generate => {
            let site_config = config::load_config(&cli.config)?;
            let http = reqwest::Client::new();
            let summary = generate::generate(
                &manifest_path,
                &cli.output,
                image_source(&http, &site_config.photos),
            )
            .await?;
            output::print_generate_output(&summary);
        }
        Command::Build => {
            let site_config = config::load_config(&cli.config)?;
            let http = reqwest::Client::new();

            println!("==> Stage 1: Fetching content for {}", site_config.site.domain);
            let manifest = fetch(&http, &site_config).await;
            write_manifest(&manifest, &cli.temp_dir, &manifest_path)?;
            output::print_fetch_output(&manifest);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let summary = generate::render_site(
                &manifest,
                &cli.output,
                image_source(&http, &site_config.photos),
            )
            .await?;
            output::print_generate_output(&summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.config)?;
            println!("==> Checking {}", site_config.site.domain);
            let manifest = fetch(&reqwest::Client::new(), &site_config).await;
            output::print_check_output(&manifest);
            if manifest.catalog.is_empty() {
                return Err(format!(
                    "no content records for domain {}",
                    manifest.catalog.domain
                )
                .into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

async fn fetch(http: &reqwest::Client, site_config: &config::SiteConfig) -> Manifest {
    let client = ContentClient::with_client(
        http.clone(),
        &site_config.content,
        &site_config.site.domain,
    );
    site::fetch_manifest(&client, &site_config.site).await
}

fn write_manifest(
    manifest: &Manifest,
    temp_dir: &Path,
    manifest_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(manifest_path, json)?;
    Ok(())
}

/// Photo search when configured, otherwise no images.
fn image_source(http: &reqwest::Client, photos: &config::PhotosConfig) -> Box<dyn ImageSource> {
    if photos.is_active() {
        Box::new(PhotoSearch::with_client(http.clone(), photos))
    } else {
        Box::new(NoImages)
    }
}
