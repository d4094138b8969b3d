//! # schetovod - Command-Line Host
//!
//! Thin orchestration layer over the engine:
//!
//! ```text
//! store (JSON snapshots) ──► snapshots ──► core (render / export) ──► files
//!                                              ▲
//!                     PngQrEncoder, XlsxEncoder ┘   (collaborators)
//! ```
//!
//! The binary owns everything the pure core refuses to: the data file,
//! logging, "today" for previews, and the external QR/workbook encoders.

mod config;
mod encoders;

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use schetovod_core::aggregate::aggregate_document;
use schetovod_core::export::sheet::{document_sheet, SpreadsheetEncoder};
use schetovod_core::export::{export_filename, xml::document_xml};
use schetovod_core::money::format_money;
use schetovod_core::render::{render_document, render_preview};
use schetovod_core::types::{format_date, DocKind, TemplateId};
use schetovod_store::{FileKv, Store};

use crate::config::Config;
use crate::encoders::{PngQrEncoder, XlsxEncoder};

// =============================================================================
// Command Line
// =============================================================================

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Kind {
    Invoice,
    Act,
    Upd,
}

impl From<Kind> for DocKind {
    fn from(kind: Kind) -> DocKind {
        match kind {
            Kind::Invoice => DocKind::Invoice,
            Kind::Act => DocKind::Act,
            Kind::Upd => DocKind::Upd,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Collection {
    Companies,
    Products,
    Invoices,
    Acts,
    Upds,
    Templates,
}

#[derive(Parser, Debug)]
#[command(name = "schetovod", version, about = "Счета, акты и УПД: печать и экспорт")]
struct Cli {
    /// Файл данных (по умолчанию $SCHETOVOD_DATA или schetovod.json)
    #[arg(long = "data", global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Создать файл данных с демо-справочниками
    Seed,

    /// Показать справочник или список документов
    List {
        #[arg(value_enum)]
        what: Collection,
    },

    /// Печатная форма документа (HTML)
    Render {
        #[arg(long, value_enum)]
        kind: Kind,
        /// Номер документа, например 0001
        #[arg(long)]
        number: String,
        /// Идентификатор шаблона; без него берется шаблон вида,
        /// а при его отсутствии - встроенная форма
        #[arg(long)]
        template: Option<String>,
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Предпросмотр шаблона на демо-данных
    Preview {
        #[arg(long)]
        template: String,
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Экспорт документа в книгу XLSX
    ExportXlsx {
        #[arg(long, value_enum)]
        kind: Kind,
        #[arg(long)]
        number: String,
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Экспорт документа в XML
    ExportXml {
        #[arg(long, value_enum)]
        kind: Kind,
        #[arg(long)]
        number: String,
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.data);
    info!(data = %config.data_path.display(), "opening store");

    let store = Store::open(Box::new(FileKv::open(&config.data_path)?))
        .with_context(|| format!("не удалось открыть {}", config.data_path.display()))?;

    match cli.command {
        Command::Seed => seed(&store, &config),
        Command::List { what } => list(&store, what),
        Command::Render {
            kind,
            number,
            template,
            output,
        } => render(&store, kind.into(), &number, template, output),
        Command::Preview { template, output } => preview(&store, &template, output),
        Command::ExportXlsx { kind, number, output } => {
            export_xlsx(&store, kind.into(), &number, output)
        }
        Command::ExportXml { kind, number, output } => {
            export_xml(&store, kind.into(), &number, output)
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

fn seed(store: &Store, config: &Config) -> Result<()> {
    // Opening an empty store already seeds it; report what's there.
    println!(
        "{}: компаний {}, товаров {}, шаблонов {}",
        config.data_path.display(),
        store.companies().len(),
        store.products().len(),
        store.templates().len(),
    );
    Ok(())
}

fn list(store: &Store, what: Collection) -> Result<()> {
    match what {
        Collection::Companies => {
            for c in store.companies() {
                println!("{}  [{:?}]  {}  ИНН {}", c.id, c.role, c.name, c.inn);
            }
        }
        Collection::Products => {
            for p in store.products() {
                println!(
                    "{}  {}  {} ({})",
                    p.id,
                    p.name,
                    format_money(p.price, p.currency),
                    p.vat
                );
            }
        }
        Collection::Invoices => list_documents(store, DocKind::Invoice),
        Collection::Acts => list_documents(store, DocKind::Act),
        Collection::Upds => list_documents(store, DocKind::Upd),
        Collection::Templates => {
            for t in store.templates() {
                println!("{}  [{}]  {}", t.id, t.doc_type.label(), t.name);
            }
        }
    }
    Ok(())
}

fn list_documents(store: &Store, kind: DocKind) {
    let companies = store.companies();
    let products = store.products();
    for doc in store.documents(kind) {
        let totals = aggregate_document(&doc, &companies, &products).totals;
        println!(
            "{} №{} от {}  {}",
            kind.label(),
            doc.number,
            format_date(doc.date),
            format_money(totals.total, doc.currency),
        );
    }
}

fn render(
    store: &Store,
    kind: DocKind,
    number: &str,
    template: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let doc = store
        .document_by_number(kind, number)
        .ok_or_else(|| anyhow!("{} №{} не найден", kind.label(), number))?;

    let tpl = match template {
        Some(id) => Some(
            store
                .template(&TemplateId::new(&id))
                .ok_or_else(|| anyhow!("шаблон {id} не найден"))?,
        ),
        None => store.template_for(kind),
    };

    let html = render_document(
        &doc,
        &store.companies(),
        &store.products(),
        tpl.as_ref(),
        &PngQrEncoder,
    )?;

    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(kind, number, "html")));
    fs::write(&path, html).with_context(|| format!("запись {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn preview(store: &Store, template: &str, output: Option<PathBuf>) -> Result<()> {
    let tpl = store
        .template(&TemplateId::new(template))
        .ok_or_else(|| anyhow!("шаблон {template} не найден"))?;

    let today = chrono::Local::now().date_naive();
    let html = render_preview(&tpl, &store.companies(), today, &PngQrEncoder)?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("preview_{}.html", tpl.id)));
    fs::write(&path, html).with_context(|| format!("запись {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn export_xlsx(
    store: &Store,
    kind: DocKind,
    number: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let doc = store
        .document_by_number(kind, number)
        .ok_or_else(|| anyhow!("{} №{} не найден", kind.label(), number))?;

    let sheet = document_sheet(&doc, &store.companies(), &store.products());
    let bytes = XlsxEncoder.encode(&sheet)?;

    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(kind, number, "xlsx")));
    fs::write(&path, bytes).with_context(|| format!("запись {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn export_xml(
    store: &Store,
    kind: DocKind,
    number: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let doc = store
        .document_by_number(kind, number)
        .ok_or_else(|| anyhow!("{} №{} не найден", kind.label(), number))?;

    let xml = document_xml(&doc, &store.companies(), &store.products())?;

    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(kind, number, "xml")));
    fs::write(&path, xml).with_context(|| format!("запись {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}
