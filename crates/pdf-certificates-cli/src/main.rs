use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use pdf_certificates::{
    BatchJob, CertificateConfig, Field, FontPaths, FontSet, OutputMode, Template,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfcert", about = "Certificate PDF generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a certificate for every CSV row
    Generate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// One combined PDF instead of a zip of single certificates
        #[arg(long, conflicts_with = "zip")]
        single: bool,

        /// Zip of single certificates even if the config asks for one PDF
        #[arg(long)]
        zip: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Render a single row to check the layout
    Preview {
        #[command(flatten)]
        sources: SourceArgs,

        /// Row to render, counting data rows from 1
        #[arg(long, default_value = "1")]
        row: usize,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show template dimensions and the default layout for it
    Inspect {
        /// Template PDF (first page is used)
        #[arg(short, long)]
        template: PathBuf,
    },

    /// Write a config file with the default layout for a template
    InitConfig {
        /// Template PDF (first page is used)
        #[arg(short, long)]
        template: PathBuf,

        /// Config file to write (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a sample CSV with the expected columns
        #[arg(long)]
        sample_csv: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Input CSV file (columns: Vardas, Klasė, TIPAS, Komentaras, optional Metai)
    #[arg(short, long)]
    input: PathBuf,

    /// Template PDF (first page is used)
    #[arg(short, long)]
    template: PathBuf,
}

#[derive(Args)]
struct SettingsArgs {
    /// Config file written by `init-config`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file name prefix
    #[arg(long)]
    prefix: Option<String>,

    /// City used when the year cell is blank
    #[arg(long)]
    city: Option<String>,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Args)]
struct LayoutArgs {
    #[arg(long)]
    type_x: Option<f32>,
    #[arg(long)]
    type_y: Option<f32>,
    #[arg(long)]
    type_size: Option<f32>,

    #[arg(long)]
    name_x: Option<f32>,
    #[arg(long)]
    name_y: Option<f32>,
    #[arg(long)]
    name_size: Option<f32>,

    #[arg(long)]
    class_x: Option<f32>,
    #[arg(long)]
    class_y: Option<f32>,
    #[arg(long)]
    class_size: Option<f32>,

    #[arg(long)]
    comment_x: Option<f32>,
    #[arg(long)]
    comment_y: Option<f32>,
    #[arg(long)]
    comment_size: Option<f32>,

    #[arg(long)]
    year_x: Option<f32>,
    #[arg(long)]
    year_y: Option<f32>,
    #[arg(long)]
    year_size: Option<f32>,

    /// Draw text starting at x instead of centered on it
    #[arg(long)]
    no_center: bool,

    /// Keep the comment on one line
    #[arg(long)]
    no_wrap_comment: bool,

    /// Comment wrap width in points
    #[arg(long)]
    comment_width: Option<f32>,

    /// Name wrap width in points
    #[arg(long)]
    name_width: Option<f32>,
}

#[derive(Args)]
struct FontArgs {
    /// TrueType font for name and class
    #[arg(long)]
    font_regular: Option<PathBuf>,

    /// TrueType font for the certificate type
    #[arg(long)]
    font_bold: Option<PathBuf>,

    /// TrueType font for comment and year
    #[arg(long)]
    font_light: Option<PathBuf>,
}

impl LayoutArgs {
    fn placements(&self) -> [(Field, Option<f32>, Option<f32>, Option<f32>); 5] {
        [
            (Field::Kind, self.type_x, self.type_y, self.type_size),
            (Field::Name, self.name_x, self.name_y, self.name_size),
            (Field::Class, self.class_x, self.class_y, self.class_size),
            (Field::Comment, self.comment_x, self.comment_y, self.comment_size),
            (Field::Year, self.year_x, self.year_y, self.year_size),
        ]
    }

    fn apply(&self, config: &mut CertificateConfig) {
        let layout = &mut config.layout;
        for (field, x, y, size) in self.placements() {
            let placement = layout.placement_mut(field);
            if let Some(x) = x {
                placement.x = x;
            }
            if let Some(y) = y {
                placement.y = y;
            }
            if let Some(size) = size {
                placement.font_size = size;
            }
        }

        if self.no_center {
            layout.center_text = false;
        }
        if self.no_wrap_comment {
            layout.wrap_comment = false;
        }
        if let Some(width) = self.comment_width {
            layout.comment_max_width = width;
        }
        if let Some(width) = self.name_width {
            layout.name_max_width = width;
        }
    }
}

impl From<&FontArgs> for FontPaths {
    fn from(args: &FontArgs) -> Self {
        Self {
            regular: args.font_regular.clone(),
            bold: args.font_bold.clone(),
            light: args.font_light.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            sources,
            output,
            single,
            zip,
            settings,
        } => {
            let mut job = prepare_job(&sources, &settings).await?;
            if single {
                job.mode = OutputMode::Single;
            } else if zip {
                job.mode = OutputMode::Zip;
            }

            let result = pdf_certificates::generate(job)
                .await
                .context("Failed to generate certificates")?;
            let path = result.write_to(&output).await.with_context(|| {
                format!("Failed to write output to {}", output.display())
            })?;
            println!(
                "Generated {} certificates → {}",
                result.count,
                path.display()
            );
        }

        Commands::Preview {
            sources,
            row,
            output,
            settings,
        } => {
            ensure!(row > 0, "Rows are numbered from 1");
            let job = prepare_job(&sources, &settings).await?;

            let file = pdf_certificates::preview(job, row - 1)
                .await
                .with_context(|| format!("Failed to render row {}", row))?;
            let path = file.write_to(&output).await.with_context(|| {
                format!("Failed to write preview to {}", output.display())
            })?;
            println!("Preview of row {} → {}", row, path.display());
        }

        Commands::Inspect { template } => {
            let template = load_template(&template).await?;
            let layout = CertificateConfig::for_page_width(template.width()).layout;

            println!("Template:");
            println!(
                "  Page size: {:.1} x {:.1} pt",
                template.width(),
                template.height()
            );
            println!("Default layout:");
            for field in Field::ALL {
                let placement = layout.placement(field);
                println!(
                    "  {:<8} x={:.1} y={:.1} size={:.1} font={:?}",
                    field.name(),
                    placement.x,
                    placement.y,
                    placement.font_size,
                    field.font_role()
                );
            }
            println!("  Name wraps at {:.1} pt", layout.name_max_width);
            println!("  Comment wraps at {:.1} pt", layout.comment_max_width);
        }

        Commands::InitConfig {
            template,
            output,
            sample_csv,
        } => {
            let template = load_template(&template).await?;
            let config = CertificateConfig::for_page_width(template.width());
            config
                .save(&output)
                .await
                .with_context(|| format!("Failed to write config to {}", output.display()))?;
            println!("Config → {}", output.display());

            if let Some(path) = sample_csv {
                pdf_certificates::write_sample_csv(&path, &config.columns)
                    .await
                    .with_context(|| format!("Failed to write sample CSV to {}", path.display()))?;
                println!("Sample CSV → {}", path.display());
            }
        }
    }

    Ok(())
}

async fn load_template(path: &Path) -> Result<Template> {
    Template::load(path)
        .await
        .with_context(|| format!("Failed to load template {}", path.display()))
}

/// Load template, config, fonts and rows, with command-line overrides applied.
async fn prepare_job(sources: &SourceArgs, settings: &SettingsArgs) -> Result<BatchJob> {
    let template = load_template(&sources.template).await?;

    let mut config = match &settings.config {
        Some(path) => {
            log::info!("Using config {}", path.display());
            CertificateConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => CertificateConfig::for_page_width(template.width()),
    };
    if let Some(prefix) = &settings.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(city) = &settings.city {
        config.city = city.clone();
    }
    settings.layout.apply(&mut config);
    config.validate().context("Invalid settings")?;

    let fonts = FontSet::load(&FontPaths::from(&settings.fonts)).await;
    let records = pdf_certificates::load_records(
        &sources.input,
        &config.columns,
        &config.city,
        pdf_certificates::current_year(),
    )
    .await
    .with_context(|| format!("Failed to read {}", sources.input.display()))?;

    Ok(BatchJob {
        records,
        template,
        layout: config.layout,
        fonts,
        mode: config.output_mode,
        prefix: config.prefix,
        timestamp: chrono::Local::now().naive_local(),
    })
}
