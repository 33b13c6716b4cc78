//! The host-facing binary.
//!
//! The host application launches this process, streams parameters over stdin
//! (`<param name="...">value</param>` lines), and watches stdout: progress
//! lines during normal operation, `RESULT: DONE.` as the completion sentinel,
//! and an `ERROR: ...` diagnostic plus a non-zero exit code on any failure.

use std::env;
use std::io;
use std::path::Path;

use clap::Parser;

use tierscribe::annotation::read_annotations;
use tierscribe::backends::whisper::{DEFAULT_MODEL_PATH, WhisperEngine};
use tierscribe::opts::Opts;
use tierscribe::params::Params;
use tierscribe::pipeline::{ProgressEvent, process_annotations};
use tierscribe::recording::Recording;
use tierscribe::refine::{ChatRefiner, TextRefiner};
use tierscribe::tier_encoder::write_tier_to_path;

#[derive(Parser, Debug)]
#[command(name = "tierscribe")]
#[command(about = "Transcribe an ELAN annotation tier with Whisper and optional LLM post-editing")]
struct Args {
    /// Container format of the source recording.
    #[arg(long = "file-type", default_value = "wav")]
    file_type: String,

    /// Post-edit each transcription with an LLM.
    #[arg(long = "llm-postedit", default_value_t = false)]
    llm_postedit: bool,
}

fn main() {
    tierscribe::logging::init();

    if let Err(err) = run() {
        // The host treats any non-sentinel output as progress or diagnostics;
        // this line plus the exit code is the whole failure contract.
        println!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn run() -> tierscribe::Result<()> {
    let args = Args::parse();
    let opts = Opts {
        source_format: args.file_type,
        enable_post_editing: args.llm_postedit,
        ..Opts::default()
    };

    let stdin = io::stdin();
    let params = Params::from_reader(stdin.lock())?;
    println!("Parameter loaded");

    // Check the output destination first so a misconfigured invocation fails
    // before any audio or model work.
    let output_tier = params.require("output_tier")?.to_owned();
    let input_tier = params.require("input_tier")?.to_owned();
    let source = params.require("source")?.to_owned();

    let mut annotations = read_annotations(Path::new(&input_tier))?;

    let recording = Recording::from_path(Path::new(&source), &opts.source_format)?;

    let model_path =
        env::var("TIERSCRIBE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
    let mut engine = WhisperEngine::new(&model_path, opts.language.clone())?;
    println!("Model loaded");

    // Credentials are resolved up front; a missing key fails before the loop.
    let refiner = if opts.enable_post_editing {
        Some(ChatRefiner::from_env()?)
    } else {
        None
    };

    process_annotations(
        &mut engine,
        refiner.as_ref().map(|r| r as &dyn TextRefiner),
        &recording,
        &mut annotations,
        |event| match event {
            ProgressEvent::Transcribed { text, .. } => println!("Output: {text}"),
            ProgressEvent::PostEdited { text, .. } => println!("Post-edited: {text}"),
            ProgressEvent::AnnotationDone { index, total } => {
                println!("Processed {}/{total} annotations", index + 1);
            }
        },
    )?;

    write_tier_to_path(Path::new(&output_tier), &annotations)?;

    // Tell the host we're done.
    println!("RESULT: DONE.");
    Ok(())
}
