use bordereau_core::config::ExportConfig;
use bordereau_core::error::BordereauError;
use bordereau_core::export::emit::DirectoryEmitter;
use bordereau_core::session::Selection;
use std::path::PathBuf;
use tracing::warn;

pub struct ExportArgs {
    pub input_file: PathBuf,
    pub select: Option<String>,
    pub all: bool,
    pub spreadsheet: bool,
    pub document: bool,
    pub template: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub force: bool,
    pub config: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<(), BordereauError> {
    // Config file first, then flags on top
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };
    if let Some(template) = args.template {
        config.template = Some(template);
    }
    if let Some(dir) = args.out_dir {
        config.output_dir = dir;
    }
    if args.force {
        config.overwrite = true;
    }

    let session = bordereau_core::import_file(&args.input_file)?;
    let len = session.dataset().len();
    let selection = if args.all {
        Selection::all(len)
    } else if let Some(spec) = &args.select {
        Selection::parse(spec, len)?
    } else {
        Selection::default()
    };
    let session = session.with_selection(selection)?;
    if session.selection().is_empty() {
        return Err(BordereauError::EmptySelection);
    }

    // Neither flag means both outputs
    let (want_spreadsheet, want_document) = match (args.spreadsheet, args.document) {
        (false, false) => (true, true),
        flags => flags,
    };

    // Settle the template before writing anything
    let template = match (want_document, &config.template) {
        (false, _) => None,
        (true, Some(path)) => Some(path.clone()),
        (true, None) if args.document => return Err(BordereauError::MissingTemplate),
        (true, None) => {
            warn!("no description template configured, skipping the description document");
            None
        }
    };

    let emitter = DirectoryEmitter::new(&config.output_dir, config.overwrite);
    let count = session.selection().len();

    if want_spreadsheet {
        let path =
            bordereau_core::export_spreadsheet(&session, &config.spreadsheet_style(), &emitter)?;
        eprintln!("Exported {count} item(s) to {}", path.display());
    }

    if let Some(template) = template {
        let path = bordereau_core::export_document_with_template(&session, &template, &emitter)?;
        eprintln!("Exported {count} description(s) to {}", path.display());
    }

    Ok(())
}
