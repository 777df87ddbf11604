//! CLI tool for inferring a form template from a flat PDF

use clap::{ArgAction, Parser};
use pdf_form_inspector::{
    extract_form, extract_form_from_text, native_fields, write_form_template, FieldOrder,
    FormError, FormStructure, InferenceOptions,
};
use std::path::{Path, PathBuf};
use std::process;

/// Infer the fillable fields of a PDF form and write them as a JSON template.
#[derive(Parser, Debug)]
#[command(name = "pdf2form")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF file to inspect (a .txt file is read as plain text pages)
    input: PathBuf,

    /// Where to write the JSON template
    #[arg(short, long, default_value = "form_template.json")]
    output: PathBuf,

    /// Sort fields by label instead of keeping document order
    #[arg(long, action = ArgAction::SetTrue)]
    sorted: bool,

    /// Print the template to stdout instead of writing a file
    #[arg(long, action = ArgAction::SetTrue)]
    stdout: bool,

    /// List the PDF's existing fillable fields instead of inferring a template
    #[arg(long, action = ArgAction::SetTrue)]
    list_fields: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), FormError> {
    if args.list_fields {
        let names = native_fields(&args.input)?;
        if names.is_empty() {
            println!("No fillable fields in {}", args.input.display());
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let options = InferenceOptions {
        order: if args.sorted {
            FieldOrder::Sorted
        } else {
            FieldOrder::Stable
        },
        ..InferenceOptions::default()
    };

    let form = load(&args.input, &options)?;

    if args.stdout {
        println!("{}", form.to_json()?);
        return Ok(());
    }

    write_form_template(&form, &args.output)?;
    println!(
        "Form template written to {} ({} fields, {} pages)",
        args.output.display(),
        form.input_fields().count(),
        form.metadata.total_pages
    );
    Ok(())
}

fn load(input: &Path, options: &InferenceOptions) -> Result<FormStructure, FormError> {
    let is_text = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    if is_text {
        let text = std::fs::read_to_string(input)?;
        Ok(extract_form_from_text(&text, options))
    } else {
        extract_form(input, options)
    }
}
