//! # claimfill CLI
//!
//! Usage:
//!   claimfill example --template anthem > claim.json
//!   claimfill fill --template anthem --claim claim.json \
//!       --signature member_signature=sig.png --attach receipt.jpg
//!   claimfill fields --template mrp

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use claimfill::{
    AttachmentFile, AttachmentQueue, Assembler, Claim, ClaimError, ClaimForm, DirectorySource, EngineConfig,
    SignatureCapture, Signatures, TemplateKind, TemplateProfile,
};

#[derive(Parser, Debug)]
#[command(name = "claimfill", version, about = "Fill insurance claim PDFs and attach receipts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a claim form and write the PDF
    Fill(FillArgs),

    /// Print a template's field table as JSON
    Fields {
        #[arg(long)]
        template: TemplateKind,
    },

    /// Print a sample claim as JSON
    Example {
        #[arg(long)]
        template: TemplateKind,
    },
}

#[derive(Args, Debug)]
struct FillArgs {
    /// Which form to fill: anthem or mrp
    #[arg(long)]
    template: TemplateKind,

    /// Claim data as JSON (see `claimfill example`)
    #[arg(long)]
    claim: PathBuf,

    /// Replace the built-in field table with this profile JSON
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Directory holding the blank template PDFs
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Signature image for a field, as FIELD=PATH. The file may hold raw
    /// PNG/JPEG bytes or a data URL.
    #[arg(long = "signature", value_parser = parse_signature_arg)]
    signatures: Vec<(String, PathBuf)>,

    /// Receipt to append (PDF or image). Repeatable; order is kept.
    #[arg(long = "attach")]
    attachments: Vec<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Engine config JSON
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claimfill=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fill(args) => fill(args),
        Command::Fields { template } => {
            println!("{}", template.profile().to_json());
            Ok(())
        }
        Command::Example { template } => {
            println!("{}", Claim::example(template).to_json());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn fill(args: FillArgs) -> Result<(), ClaimError> {
    let mut config = EngineConfig::load(args.config.as_deref())?;
    if let Some(assets) = args.assets {
        config.assets_dir = assets;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let profile = match &args.profile {
        Some(path) => TemplateProfile::from_json(&fs::read_to_string(path)?)?,
        None => args.template.profile(),
    };
    let claim = Claim::from_json(args.template, &fs::read_to_string(&args.claim)?)?;

    let mut signatures = Signatures::new();
    for (field, path) in &args.signatures {
        signatures.insert(field.clone(), read_signature(field, path)?);
    }

    let mut queue = AttachmentQueue::new(config.attachment_limit_bytes);
    let mut files = Vec::with_capacity(args.attachments.len());
    for path in &args.attachments {
        files.push(read_attachment(path)?);
    }
    report_rejections(queue.add_all(files))?;
    if !args.attachments.is_empty() {
        eprintln!("  Attachments: {}", queue.usage_label());
    }

    let source = DirectorySource::new(&config.assets_dir);
    let document = Assembler::new(source, profile)
        .with_config(&config)
        .assemble(&claim.snapshot(), &signatures, queue.slots())?;

    fs::create_dir_all(&config.output_dir)?;
    let output_path = config.output_dir.join(&document.filename);
    fs::write(&output_path, &document.bytes)?;
    eprintln!("✓ Written {} bytes to {}", document.bytes.len(), output_path.display());
    Ok(())
}

/// Print per-file intake rejections and keep going; anything else aborts.
/// Returns how many files were rejected.
fn report_rejections(results: Vec<Result<usize, ClaimError>>) -> Result<usize, ClaimError> {
    let mut rejected = 0;
    for err in results.into_iter().filter_map(Result::err) {
        if !err.is_intake_rejection() {
            return Err(err);
        }
        eprintln!("✗ {}", err);
        rejected += 1;
    }
    Ok(rejected)
}

fn parse_signature_arg(s: &str) -> Result<(String, PathBuf), String> {
    let (field, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=PATH, got '{}'", s))?;
    if field.is_empty() || path.is_empty() {
        return Err(format!("expected FIELD=PATH, got '{}'", s));
    }
    Ok((field.to_string(), PathBuf::from(path)))
}

fn read_signature(field: &str, path: &Path) -> Result<SignatureCapture, ClaimError> {
    let bytes = fs::read(path)?;
    if bytes.starts_with(b"data:image/") {
        let url = String::from_utf8_lossy(&bytes);
        SignatureCapture::from_data_url(url.trim()).map_err(|reason| ClaimError::Signature {
            field: field.to_string(),
            reason,
        })
    } else {
        Ok(SignatureCapture::from_bytes(bytes))
    }
}

fn read_attachment(path: &Path) -> Result<AttachmentFile, ClaimError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(AttachmentFile::new(name, media_type_for(path), fs::read(path)?))
}

/// Guess a media type from the file extension.
fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
