//! atspdf CLI - invisible keyword embedding and ATS scoring

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use atspdf::ats::AtsAnalysisResult;
use atspdf::render::{self, JsonFormat};
use atspdf::{
    AtsPdf, Color, ComposeOptions, ExtractOptions, Grade, InvisibleStyle, KeywordSet,
    KeywordSource, PageSize, ParseOptions, TaxonomyStore, TextExtractor,
};

#[derive(Parser)]
#[command(name = "atspdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Embed invisible ATS keywords in PDFs and score resumes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new PDF from a text file with an invisible keyword layer
    Create {
        /// Text file with the visible lines ("-" for stdin)
        #[arg(value_name = "TEXT")]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Page size
        #[arg(long, default_value = "letter", value_parser = parse_page_size)]
        page_size: PageSize,

        #[command(flatten)]
        keywords: KeywordArgs,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Append an invisible keyword layer to every page of a PDF
    Modify {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip unreadable objects instead of failing
        #[arg(long)]
        lenient: bool,

        #[command(flatten)]
        keywords: KeywordArgs,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Score one or more PDFs against a reference keyword set
    #[command(alias = "score")]
    Analyze {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output JSON instead of a report
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,

        /// Skip unreadable objects instead of failing
        #[arg(long)]
        lenient: bool,

        #[command(flatten)]
        keywords: KeywordArgs,

        #[command(flatten)]
        visibility: VisibilityArgs,
    },

    /// Extract text from a PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Drop text a reader cannot see
        #[arg(long)]
        visible_only: bool,

        /// Keep line breaks between text on different baselines
        #[arg(long)]
        lines: bool,

        #[command(flatten)]
        visibility: VisibilityArgs,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Browse the keyword taxonomy
    Taxonomy {
        /// Custom taxonomy JSON file
        #[arg(long, value_name = "FILE", env = "ATSPDF_TAXONOMY", global = true)]
        file: Option<PathBuf>,

        #[command(subcommand)]
        command: TaxonomyCommands,
    },
}

#[derive(Subcommand)]
enum TaxonomyCommands {
    /// List all categories
    List,
    /// Search categories by name or tag
    Search {
        /// Case-insensitive search text
        query: String,
    },
    /// Show one category's keywords
    Show {
        /// Category id
        id: String,
    },
}

/// Where the keyword set comes from.
#[derive(Args)]
struct KeywordArgs {
    /// Keywords separated by commas, semicolons or newlines
    #[arg(short, long, value_name = "LIST")]
    keywords: Option<String>,

    /// Read keywords from a file, one per line
    #[arg(long, value_name = "FILE", conflicts_with = "keywords")]
    keywords_file: Option<PathBuf>,

    /// Taxonomy category id (repeatable)
    #[arg(short, long = "category", value_name = "ID")]
    categories: Vec<String>,

    /// Custom taxonomy JSON file
    #[arg(long, value_name = "FILE", env = "ATSPDF_TAXONOMY")]
    taxonomy: Option<PathBuf>,
}

/// Appearance of the embedded layer.
#[derive(Args)]
struct StyleArgs {
    /// Font size of the keyword layer in points
    #[arg(long, env = "ATSPDF_FONT_SIZE", default_value_t = 0.1)]
    font_size: f32,

    /// Fill color of the keyword layer as hex (e.g. FFFFFF)
    #[arg(long, env = "ATSPDF_FILL", default_value = "FFFFFF", value_parser = parse_color)]
    fill: Color,

    /// Compress the appended content stream
    #[arg(long)]
    compress: bool,
}

/// What counts as invisible text.
#[derive(Args)]
struct VisibilityArgs {
    /// Color distance (CIE76) treated as background
    #[arg(long, env = "ATSPDF_TOLERANCE", default_value_t = atspdf::extract::DEFAULT_TOLERANCE)]
    tolerance: f32,

    /// Page background color as hex
    #[arg(long, env = "ATSPDF_BACKGROUND", default_value = "FFFFFF", value_parser = parse_color)]
    background: Color,
}

impl KeywordArgs {
    fn resolve(&self) -> Result<KeywordSet, Box<dyn std::error::Error>> {
        if let Some(list) = &self.keywords {
            return Ok(KeywordSet::parse(list));
        }
        if let Some(path) = &self.keywords_file {
            return Ok(KeywordSet::parse(&fs::read_to_string(path)?));
        }

        let source = if self.categories.is_empty() {
            KeywordSource::Default
        } else {
            KeywordSource::Taxonomy(self.categories.clone())
        };
        let set = match &self.taxonomy {
            Some(path) => source.keywords(&TaxonomyStore::load(path)?)?,
            None => source.keywords(TaxonomyStore::builtin())?,
        };
        Ok(set)
    }
}

impl StyleArgs {
    fn style(&self) -> InvisibleStyle {
        InvisibleStyle::new()
            .with_font_size(self.font_size)
            .with_fill(self.fill)
            .compressed(self.compress)
    }
}

impl VisibilityArgs {
    fn options(&self) -> ExtractOptions {
        ExtractOptions::new()
            .with_tolerance(self.tolerance)
            .with_background(self.background)
    }
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).ok_or_else(|| format!("invalid color: {}", s))
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    match s.to_ascii_lowercase().as_str() {
        "letter" => Ok(PageSize::Letter),
        "a4" => Ok(PageSize::A4),
        "legal" => Ok(PageSize::Legal),
        _ => Err(format!("unknown page size: {} (letter, a4, legal)", s)),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create {
            input,
            output,
            page_size,
            keywords,
            style,
        } => cmd_create(&input, &output, page_size, &keywords, &style),
        Commands::Modify {
            input,
            output,
            lenient,
            keywords,
            style,
        } => cmd_modify(&input, output.as_deref(), lenient, &keywords, &style),
        Commands::Analyze {
            inputs,
            json,
            compact,
            lenient,
            keywords,
            visibility,
        } => cmd_analyze(&inputs, json, compact, lenient, &keywords, &visibility),
        Commands::Extract {
            input,
            output,
            visible_only,
            lines,
            visibility,
        } => cmd_extract(&input, output.as_deref(), visible_only, lines, &visibility),
        Commands::Info { input } => cmd_info(&input),
        Commands::Taxonomy { file, command } => cmd_taxonomy(file.as_deref(), command),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_create(
    input: &Path,
    output: &Path,
    page_size: PageSize,
    keywords: &KeywordArgs,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = if input == Path::new("-") {
        std::io::read_to_string(std::io::stdin())?
    } else {
        fs::read_to_string(input)?
    };
    let keywords = keywords.resolve()?;

    let bytes = AtsPdf::new()
        .with_compose_options(ComposeOptions::new().with_page_size(page_size))
        .with_style(style.style())
        .create(&text, &keywords)?;
    atspdf::io::write_atomic(output, &bytes)?;

    println!(
        "{} {} ({} keywords embedded)",
        "Saved to".green(),
        output.display(),
        keywords.len()
    );
    Ok(())
}

fn cmd_modify(
    input: &Path,
    output: Option<&Path>,
    lenient: bool,
    keywords: &KeywordArgs,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let keywords = keywords.resolve()?;
    let output = output.unwrap_or(input);

    let mut builder = AtsPdf::new().with_style(style.style());
    if lenient {
        builder = builder.lenient();
    }
    let pages = builder.modify_file(input, output, &keywords)?;

    println!(
        "{} {} ({} keywords on {} pages)",
        "Saved to".green(),
        output.display(),
        keywords.len(),
        pages
    );
    Ok(())
}

fn cmd_analyze(
    inputs: &[PathBuf],
    json: bool,
    compact: bool,
    lenient: bool,
    keywords: &KeywordArgs,
    visibility: &VisibilityArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let reference = keywords.resolve()?;
    let mut builder = AtsPdf::new().with_extract_options(visibility.options());
    if lenient {
        builder = builder.with_parse_options(ParseOptions::new().lenient());
    }

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    if let [input] = inputs {
        let result = builder.analyze_file(input, &reference)?;
        if json {
            println!("{}", render::to_json(&result, format)?);
        } else {
            print_report(input, &result);
        }
        return Ok(());
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Analyzing...");
    let outcomes = builder.analyze_files_with(inputs, &reference, |_| pb.inc(1));
    pb.finish_and_clear();

    let mut failed = 0;
    let mut results = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push((path, result)),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "Failed".red(), path.display(), e);
            }
        }
    }

    if json {
        let values: Vec<AtsAnalysisResult> = results.into_iter().map(|(_, r)| r).collect();
        println!("{}", render::to_json_batch(&values, format)?);
    } else {
        println!("{}", "ATS Scores".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (path, result) in &results {
            println!(
                "{:>3} {}  {}",
                result.score.overall,
                colored_grade(result.score.grade),
                path.display()
            );
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn print_report(input: &Path, result: &AtsAnalysisResult) {
    println!("{}", "ATS Analysis".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {}/100 ({})",
        "Overall".bold(),
        result.score.overall,
        colored_grade(result.score.grade)
    );
    println!();
    println!("{}", render::to_text(result));
}

fn colored_grade(grade: Grade) -> colored::ColoredString {
    let letter = grade.to_string();
    match grade {
        Grade::A => letter.green().bold(),
        Grade::B => letter.green(),
        Grade::C => letter.yellow(),
        Grade::D => letter.red(),
        Grade::F => letter.red().bold(),
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    visible_only: bool,
    lines: bool,
    visibility: &VisibilityArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = atspdf::parse_file(input)?;
    let options = visibility
        .options()
        .excluding_invisible(visible_only)
        .preserving_lines(lines);
    let text = TextExtractor::new(&doc, options).extract()?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient so metadata shows even when some objects are unreadable
    let doc = atspdf::parse_file_with_options(input, ParseOptions::new().lenient())?;
    let metadata = doc.metadata()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), metadata.page_count);
    println!("{}: {}", "Revisions".bold(), metadata.revision_count);

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let options = ExtractOptions::new();
    let pages = TextExtractor::new(&doc, options.clone()).extract_pages()?;
    let all = atspdf::extract::join_pages(&pages, &options);
    let visible = atspdf::extract::join_pages(&pages, &options.clone().excluding_invisible(true));
    let total_words = all.split_whitespace().count();
    let visible_words = visible.split_whitespace().count();

    println!("{}: {}", "Words".bold(), visible_words);
    println!("{}: {}", "Characters".bold(), visible.chars().count());
    println!(
        "{}: {}",
        "Hidden words".bold(),
        total_words.saturating_sub(visible_words)
    );

    Ok(())
}

fn cmd_taxonomy(
    file: Option<&Path>,
    command: TaxonomyCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded;
    let store = match file {
        Some(path) => {
            loaded = TaxonomyStore::load(path)?;
            &loaded
        }
        None => TaxonomyStore::builtin(),
    };

    match command {
        TaxonomyCommands::List => {
            for entry in store.entries() {
                println!("{:<28} {}", entry.id.cyan(), entry.name);
            }
        }
        TaxonomyCommands::Search { query } => {
            let hits = store.search(&query);
            if hits.is_empty() {
                println!("{}", "No matching categories".yellow());
            }
            for entry in hits {
                println!(
                    "{:<28} {} {}",
                    entry.id.cyan(),
                    entry.name,
                    format!("({})", entry.popularity).dimmed()
                );
            }
        }
        TaxonomyCommands::Show { id } => {
            let entry = store.get(&id)?;
            println!("{}", entry.name.cyan().bold());
            println!("{}", "─".repeat(40).dimmed());
            let tiers = [
                ("Required", &entry.required),
                ("Preferred", &entry.preferred),
                ("Bonus", &entry.bonus),
            ];
            for (label, list) in tiers {
                if !list.is_empty() {
                    println!("{}: {}", label.bold(), list.join(", "));
                }
            }
            if !entry.tags.is_empty() {
                println!("{}: {}", "Tags".bold(), entry.tags.join(", ").dimmed());
            }
        }
    }

    Ok(())
}
