//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use trellis_core::{extract_call_graph, Language, ScanOptions};
use trellis_graph::{build_call_graph, export_run, ExportOptions, RunArtifacts};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Everything one analysis run needs.
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub root: PathBuf,
    pub language: String,
    pub output: PathBuf,
    pub follow_symlinks: bool,
    pub render_image: bool,
}

/// Scan, assemble and export one run.
pub fn analyze(args: &AnalyzeArgs) -> Result<RunArtifacts> {
    // Configuration errors surface before anything is read.
    let language: Language = args.language.parse()?;

    println!(
        "{} {} ({})",
        "Analyzing".cyan(),
        args.root.display(),
        language.to_string().cyan()
    );
    let start = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Scanning files...");

    let options = ScanOptions {
        follow_symlinks: args.follow_symlinks,
    };
    let extraction = match extract_call_graph(&args.root, language, &options) {
        Ok(extraction) => extraction,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    spinner.set_message("Writing artifacts...");
    let graph = build_call_graph(&extraction.symbols, &extraction.calls);
    let export_options = ExportOptions {
        render_image: args.render_image,
    };
    let run = export_run(&graph, &args.output, &export_options);
    spinner.finish_and_clear();
    let run = run?;

    println!(
        "{} Scanned {} files: {} definitions, {} calls in {}ms",
        "✓".green(),
        extraction.files_scanned.to_string().cyan(),
        extraction.symbols.len().to_string().cyan(),
        extraction.calls.len().to_string().cyan(),
        start.elapsed().as_millis()
    );

    if extraction.files_scanned == 0 {
        eprintln!("\n{} No {} files found under {}", "⚠ Warning:".yellow(), language, args.root.display());
    }

    println!("{} Run {}", "✓".green(), run.run_id.bold());
    println!("  {}", run.json.display());
    println!("  {}", run.csv.display());
    if let Some(image) = &run.image {
        println!("  {}", image.display());
    }

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(root: PathBuf, output: PathBuf, language: &str) -> AnalyzeArgs {
        AnalyzeArgs {
            root,
            language: language.to_string(),
            output,
            follow_symlinks: false,
            render_image: false,
        }
    }

    #[test]
    fn test_analyze_writes_run() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.py"), "def f():\n    g()\n\ndef g():\n    pass\n").unwrap();

        let out = dir.path().join("out");
        let run = analyze(&args(src, out.clone(), "python")).unwrap();

        assert!(run.json.starts_with(&out));
        assert!(run.csv.exists());
        let csv = fs::read_to_string(&run.csv).unwrap();
        assert!(csv.contains("f,,a.py,f,g"));
    }

    #[test]
    fn test_unsupported_language_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");

        let err = analyze(&args(dir.path().to_path_buf(), out.clone(), "cobol")).unwrap_err();
        assert!(err.to_string().contains("cobol"));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_root_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");

        let result = analyze(&args(dir.path().join("missing"), out.clone(), "go"));
        assert!(result.is_err());
        assert!(!out.exists());
    }
}
