//! boxnote-html CLI - Box Notes to HTML email body converter

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use boxnote_html::{
    placeholders, AuthContext, BoxnoteHtml, CleanupPreset, ImageFailurePolicy, MarkKind, NodeKind,
    ReferenceResolver, TemplateValues, Traversal,
};

#[derive(Parser)]
#[command(name = "boxnote-html")]
#[command(version)]
#[command(about = "Convert Box Notes into standalone HTML email bodies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a note to HTML
    Convert {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file ("-" for stdout; defaults to FILE with an .html extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Directory holding note attachments (defaults to the file's directory)
        #[arg(short, long, value_name = "DIR")]
        workdir: Option<PathBuf>,

        /// Box access token for downloading attachments
        #[arg(long, env = "BOX_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Box user id to act as
        #[arg(long, env = "BOX_USER_ID")]
        user: Option<String>,

        /// How images are written into the HTML
        #[arg(long, value_enum, default_value = "embed")]
        images: ImageMode,

        /// Drop images that fail to resolve instead of marking them
        #[arg(long)]
        omit_failed_images: bool,

        /// Resolve images in parallel
        #[arg(long)]
        parallel: bool,

        /// Use the recursive walk instead of the explicit-stack one
        #[arg(long)]
        recursive: bool,

        /// Cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Print render statistics
        #[arg(long)]
        stats: bool,
    },

    /// Fill ${KEY} placeholders in an HTML file
    Fill {
        /// Input HTML file ("-" for stdin)
        #[arg(value_name = "HTML")]
        input: PathBuf,

        /// Placeholder value as KEY=VALUE (repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        values: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show note structure and placeholders
    Info {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ImageMode {
    /// Inline attachments as data URIs (local files, then Box API)
    Embed,
    /// Reference attachments by relative path
    Link,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Remove empty paragraphs only (default)
    Minimal,
    /// Also normalize Unicode and drop empty inline wrappers
    Standard,
    /// Also drop zero-width characters
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

struct ConvertArgs {
    title: Option<String>,
    workdir: Option<PathBuf>,
    auth: AuthContext,
    images: ImageMode,
    omit_failed_images: bool,
    parallel: bool,
    recursive: bool,
    cleanup: Option<CleanupLevel>,
    stats: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            title,
            workdir,
            token,
            user,
            images,
            omit_failed_images,
            parallel,
            recursive,
            cleanup,
            stats,
        } => {
            let args = ConvertArgs {
                title,
                workdir,
                auth: AuthContext::from_parts(token.as_deref(), user.as_deref()),
                images,
                omit_failed_images,
                parallel,
                recursive,
                cleanup,
                stats,
            };
            cmd_convert(&input, output.as_deref(), args)
        }
        Commands::Fill {
            input,
            values,
            output,
        } => cmd_fill(&input, &values, output.as_deref()),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    args: ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = BoxnoteHtml::new()
        .with_auth(args.auth)
        .with_parallel_images(args.parallel)
        .with_stats(args.stats);

    if let Some(title) = args.title {
        builder = builder.with_title(title);
    }
    if let Some(workdir) = args.workdir {
        builder = builder.with_workdir(workdir);
    }
    if args.images == ImageMode::Link {
        builder = builder.with_resolver(ReferenceResolver::new());
    }
    if args.omit_failed_images {
        builder = builder.with_image_failure(ImageFailurePolicy::Omit);
    }
    if args.recursive {
        builder = builder.with_traversal(Traversal::Recursive);
    }
    if let Some(level) = args.cleanup {
        builder = builder.with_cleanup(level.into());
    }

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    if !is_stdio(&output_path) && output_path == input {
        return Err(format!("refusing to overwrite input file {}", input.display()).into());
    }

    let result = builder.convert_file(input)?;
    log::info!("Rendered {} bytes of HTML", result.content_len());

    let to_stdout = is_stdio(&output_path);
    write_output(&output_path, &result.html)?;

    if args.stats {
        let s = &result.stats;
        eprintln!("{}", "Render Statistics".cyan().bold());
        eprintln!("{}", "─".repeat(40).dimmed());
        eprintln!("{}: {}", "Paragraphs".bold(), s.paragraph_count);
        eprintln!("{}: {}", "Unwrapped paragraphs".bold(), s.suppressed_paragraph_count);
        eprintln!("{}: {}", "Text runs".bold(), s.text_run_count);
        eprintln!("{}: {}", "Images resolved".bold(), s.images_resolved);
        if s.images_failed > 0 {
            eprintln!("{}: {}", "Images failed".bold(), s.images_failed.to_string().yellow());
        } else {
            eprintln!("{}: {}", "Images failed".bold(), s.images_failed);
        }
        eprintln!("{}: {}", "Unknown nodes".bold(), s.unknown_node_count);
        eprintln!("{}: {}", "Max depth".bold(), s.max_depth);
    }

    if !to_stdout {
        eprintln!("{} {}", "Saved to".green(), output_path.display());
    }

    Ok(())
}

fn cmd_fill(
    input: &Path,
    assignments: &[String],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = read_input(input)?;
    let values = TemplateValues::from_assignments(assignments)?;

    let filled = boxnote_html::fill_placeholders(&html, &values);

    let remaining = placeholders(&filled);
    if !remaining.is_empty() {
        log::warn!("Unfilled placeholders: {}", remaining.join(", "));
        eprintln!(
            "{} {}",
            "Unfilled placeholders:".yellow(),
            remaining.join(", ")
        );
    }

    match output {
        Some(path) => {
            write_output(path, &filled)?;
            if !is_stdio(path) {
                eprintln!("{} {}", "Saved to".green(), path.display());
            }
        }
        None => write_output(Path::new("-"), &filled)?,
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = boxnote_html::parse_file(input)?;

    println!("{}", "Note Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Top-level nodes".bold(), doc.content.len());
    println!("{}: {}", "Total nodes".bold(), doc.node_count());
    println!("{}: {}", "Max depth".bold(), doc.max_depth());
    println!("{}: {}", "Images".bold(), doc.count_kind(&NodeKind::Image));
    println!("{}: {}", "Unknown nodes".bold(), doc.unknown_node_count());

    let text = doc.plain_text();
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());

    println!();
    println!("{}", "Node Types".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for kind in NodeKind::CATALOG.iter() {
        let count = doc.count_kind(kind);
        if count > 0 {
            println!("  {:<18} {}", kind.as_str(), count);
        }
    }

    let mut mark_counts: Vec<(String, usize)> = Vec::new();
    for mark in doc.nodes().flat_map(|node| node.marks.iter()) {
        let name = match &mark.kind {
            MarkKind::Unknown(tag) if tag.is_empty() => "(untyped)".to_string(),
            kind => kind.as_str().to_string(),
        };
        match mark_counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => mark_counts.push((name, 1)),
        }
    }
    if !mark_counts.is_empty() {
        println!();
        println!("{}", "Marks".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (name, count) in &mark_counts {
            println!("  {:<18} {}", name, count);
        }
    }

    let keys = placeholders(&text);
    if !keys.is_empty() {
        println!();
        println!("{}", "Placeholders".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for key in keys {
            println!("  ${{{}}}", key);
        }
    }

    Ok(())
}

/// `<input>.html`, or `<input>.out.html` when the input already ends in `.html`.
fn default_output(input: &Path) -> PathBuf {
    let output = input.with_extension("html");
    if output == input {
        input.with_extension("out.html")
    } else {
        output
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> io::Result<String> {
    if is_stdio(path) {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: &Path, content: &str) -> io::Result<()> {
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()
    } else {
        fs::write(path, content)
    }
}
