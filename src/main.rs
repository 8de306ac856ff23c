//! # pdf-reporter CLI
//!
//! Usage:
//!   pdf-reporter --rows rows.json --columns columns.json -o report.pdf
//!   pdf-reporter --rows rows.json --infer-columns --title "Ventas"
//!   pdf-reporter --table-data grid.json --portrait --blob-url

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;

use pdf_reporter::columns::infer_column_configs;
use pdf_reporter::model::{ExportOptions, ExportPayload, Orientation};
use pdf_reporter::{ingest, ExportError, PdfDocument};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render grid data described as JSON into a paginated PDF report")]
struct Args {
    /// JSON array of row objects
    #[arg(long, required_unless_present = "table_data")]
    rows: Option<PathBuf>,

    /// JSON array of column configurations
    #[arg(long)]
    columns: Option<PathBuf>,

    /// JSON array of column definitions or column groups
    #[arg(long)]
    groups: Option<PathBuf>,

    /// JSON array of summary rows appended after the data
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Combined table-data document (rows plus optional columns and groups)
    #[arg(long, conflicts_with_all = ["rows", "columns", "groups", "summary"])]
    table_data: Option<PathBuf>,

    /// JSON file with export options; flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    /// Portrait instead of landscape
    #[arg(long)]
    portrait: bool,

    /// Header fill color as hex
    #[arg(long)]
    header_fill: Option<String>,

    /// Header text color as hex
    #[arg(long)]
    header_color: Option<String>,

    /// Base font size; body cells use two points less
    #[arg(long)]
    font_size: Option<f64>,

    /// Column whose cells become links
    #[arg(long)]
    link_text_column: Option<String>,

    /// Row key holding each link's URL
    #[arg(long)]
    link_url_column: Option<String>,

    /// Logo as file path, data URI, raw base64, or `none`
    #[arg(long)]
    logo: Option<String>,

    /// Date printed in the page header (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Derive the column configuration from the rows when none is given
    #[arg(long)]
    infer_columns: bool,

    /// Output path; defaults to the report's file name in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a data URL for the PDF instead of writing a file
    #[arg(long)]
    blob_url: bool,
}

impl Args {
    fn options(&self) -> Result<ExportOptions, ExportError> {
        let mut options = match &self.options {
            Some(path) => ingest::parse_options(&fs::read_to_string(path)?)?,
            None => ExportOptions::default(),
        };
        if self.portrait {
            options.orientation = Orientation::Portrait;
        }
        let overrides = [
            (&mut options.title, &self.title),
            (&mut options.subtitle, &self.subtitle),
            (&mut options.header_fill, &self.header_fill),
            (&mut options.header_color, &self.header_color),
            (&mut options.link_text_column, &self.link_text_column),
            (&mut options.link_url_column, &self.link_url_column),
            (&mut options.logo, &self.logo),
        ];
        for (field, flag) in overrides {
            if flag.is_some() {
                field.clone_from(flag);
            }
        }
        options.font_size = self.font_size.or(options.font_size);
        options.generated_on = self.date.or(options.generated_on);
        Ok(options)
    }
}

fn read_optional(path: Option<&PathBuf>) -> Result<Option<String>, ExportError> {
    path.map(fs::read_to_string).transpose().map_err(ExportError::from)
}

fn render(args: &Args) -> Result<PdfDocument, ExportError> {
    let options = args.options()?;

    if let Some(path) = &args.table_data {
        return pdf_reporter::export_table_data(&fs::read_to_string(path)?, options);
    }

    let rows = match read_optional(args.rows.as_ref())? {
        Some(raw) => ingest::parse_rows(&raw)?,
        None => Vec::new(),
    };
    let mut columns = match read_optional(args.columns.as_ref())? {
        Some(raw) => ingest::parse_column_configs(&raw)?,
        None => Vec::new(),
    };
    if columns.is_empty() && args.infer_columns {
        columns = infer_column_configs(&rows);
        log::info!("inferred {} columns from the rows", columns.len());
    }
    let structure = match read_optional(args.groups.as_ref())? {
        Some(raw) => ingest::parse_structure(&raw)?,
        None => None,
    };
    let summary_rows = match read_optional(args.summary.as_ref())? {
        Some(raw) => ingest::parse_summary_rows(&raw)?,
        None => Vec::new(),
    };

    pdf_reporter::export(&ExportPayload {
        rows,
        columns,
        structure,
        summary_rows,
        options,
    })
}

fn run(args: &Args) -> Result<(), ExportError> {
    let document = render(args)?;

    if args.blob_url {
        println!("{}", document.blob_url());
        return Ok(());
    }

    let path = match &args.output {
        Some(path) => {
            document.save(path)?;
            path.clone()
        }
        None => document.save_in(".")?,
    };
    eprintln!(
        "✓ {} página(s), {} bytes escritos en {}",
        document.page_count(),
        document.bytes().len(),
        path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            if e.is_input_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
