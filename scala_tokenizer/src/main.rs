use scala_tokenizer::batch::{BatchConfig, BatchProcessor, BatchResults};
use scala_tokenizer::config::{parse_log_level, LogLevel, RuntimePreferences};
use scala_tokenizer::file_processor::FileProcessor;
use scala_tokenizer::logging::codes;
use scala_tokenizer::report::TokenReport;
use scala_tokenizer::{lexical, logging, Scanner, TokenCounts, TokenKind};
use std::env;
use std::path::Path;

/// Options collected from the command line
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    json: bool,
    pretty: bool,
    counts: bool,
    recursive: Option<bool>,
    threads: Option<usize>,
    fail_fast: bool,
    config_file: Option<String>,
    log_json: bool,
    log_level: Option<LogLevel>,
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.scala|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };

    let mut preferences = match &options.config_file {
        Some(path) => match RuntimePreferences::load_from_file(path) {
            Ok(preferences) => preferences,
            Err(error) => {
                eprintln!("Error [{}]: {}", error.error_code(), error);
                std::process::exit(2);
            }
        },
        None => RuntimePreferences::from_env(),
    };
    apply_overrides(&mut preferences, &options);

    let initialized = logging::init_global_logging_with(&preferences.logging)
        .and_then(|_| lexical::init_lexical_logging());
    if let Err(message) = initialized {
        eprintln!("Error [{}]: {}", codes::system::INITIALIZATION_FAILURE, message);
        std::process::exit(2);
    }

    let input_path = Path::new(&args[1]);
    if input_path.is_file() {
        process_single_file(input_path, &preferences, &options)
    } else if input_path.is_dir() {
        process_directory_batch(input_path, &preferences, &options)
    } else {
        eprintln!("Error: Input must be a file or directory");
        eprintln!("  Path: {}", input_path.display());
        std::process::exit(1);
    }
}

fn print_help(program_name: &str) {
    println!("Scala Tokenizer v{}", env!("CARGO_PKG_VERSION"));
    println!("Line-numbered token streams for Scala source");
    println!();
    println!("USAGE:");
    println!("    {} <file.scala>               # Tokenize one file", program_name);
    println!("    {} <directory> [options]      # Tokenize a directory", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Emit a JSON token report");
    println!("    --pretty            Pretty-print JSON output");
    println!("    --counts            Print per-kind token counts only");
    println!("    --recursive         Search subdirectories (default)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --threads N         Worker threads for directories");
    println!("    --fail-fast         Stop scheduling files after the first failure");
    println!("    --config FILE       Load preferences from a TOML file");
    println!("    --log-json          Emit log events as JSON lines");
    println!("    --log-level LEVEL   error, warning, info or debug");
    println!("    --quiet             Only log errors");
    println!();
    println!("TEXT OUTPUT:");
    println!("    One token per line: <line>: <KIND> <value>");
    println!();
    println!("EXAMPLES:");
    println!("    {} Main.scala", program_name);
    println!("    {} src/ --json --pretty", program_name);
    println!("    {} src/ --threads 4 --counts", program_name);
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => options.json = true,
            "--pretty" => options.pretty = true,
            "--counts" => options.counts = true,
            "--recursive" => options.recursive = Some(true),
            "--no-recursive" => options.recursive = Some(false),
            "--fail-fast" => options.fail_fast = true,
            "--log-json" => options.log_json = true,
            "--quiet" => options.quiet = true,
            "--threads" => {
                let value = args.get(i + 1).ok_or("--threads requires a number")?;
                let threads = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid thread count '{}'", value))?;
                options.threads = Some(threads);
                i += 1;
            }
            "--config" => {
                let value = args.get(i + 1).ok_or("--config requires a file path")?;
                options.config_file = Some(value.clone());
                i += 1;
            }
            "--log-level" => {
                let value = args.get(i + 1).ok_or("--log-level requires a level")?;
                options.log_level =
                    Some(parse_log_level(value).ok_or(format!("Unknown log level '{}'", value))?);
                i += 1;
            }
            other => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
        }
        i += 1;
    }

    Ok(options)
}

fn apply_overrides(preferences: &mut RuntimePreferences, options: &CliOptions) {
    if let Some(recursive) = options.recursive {
        preferences.batch.recursive = recursive;
    }
    if let Some(threads) = options.threads {
        preferences.batch.max_threads = threads;
    }
    if options.fail_fast {
        preferences.batch.fail_fast = true;
    }
    if options.log_json {
        preferences.logging.use_structured_logging = true;
    }
    if let Some(level) = options.log_level {
        preferences.logging.min_log_level = level;
    }
    if options.quiet {
        preferences.logging.min_log_level = LogLevel::Error;
    }
}

fn process_single_file(
    file_path: &Path,
    preferences: &RuntimePreferences,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let processor = FileProcessor::with_preferences(&preferences.file_processor);
    let file_result = match processor.process_file(file_path) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("Error [{}]: {}", error.error_code(), error);
            std::process::exit(1);
        }
    };

    let mut scanner = Scanner::with_preferences(preferences.lexical.clone());
    let output = lexical::tokenize_file_result(&mut scanner, &file_result);

    if options.json {
        let report = TokenReport::from_file(
            &file_result.metadata.path,
            file_result.metadata.line_count,
            output.tokens,
        );
        print_report(&report, options.pretty);
    } else if options.counts {
        print_counts(&file_path.display().to_string(), &output.counts());
    } else {
        print!("{}", scanner.show_tokens());
    }

    Ok(())
}

fn process_directory_batch(
    dir_path: &Path,
    preferences: &RuntimePreferences,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let processor = BatchProcessor::new(BatchConfig::from_preferences(&preferences.batch))
        .with_file_preferences(preferences.file_processor.clone())
        .with_lexical_preferences(preferences.lexical.clone());

    let results = match processor.process_directory(dir_path) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("Error [{}]: {}", error.error_code(), error);
            std::process::exit(1);
        }
    };

    if options.json {
        print_report(&TokenReport::from_batch(&results), options.pretty);
    } else if options.counts {
        for file in &results.files {
            print_counts(&file.path.display().to_string(), &file.counts());
        }
        print_counts("total", &results.total_counts());
    } else {
        for file in &results.files {
            println!("== {} ==", file.path.display());
            for token in &file.tokens {
                println!("{}", token);
            }
        }
    }

    print_failures(&results);
    if results.failure_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &TokenReport, pretty: bool) {
    match report.to_json(pretty) {
        Ok(json) => println!("{}", json),
        Err(error) => {
            eprintln!("Error [{}]: {}", codes::output::SERIALIZATION_ERROR, error);
            std::process::exit(1);
        }
    }
}

fn format_counts(label: &str, counts: &TokenCounts) -> String {
    let per_kind: Vec<String> = TokenKind::ALL
        .iter()
        .map(|kind| format!("{} {}", kind, counts.get(*kind)))
        .collect();
    format!(
        "{}: {} tokens ({}, merged {})",
        label,
        counts.total(),
        per_kind.join(", "),
        counts.merged_operators
    )
}

fn print_counts(label: &str, counts: &TokenCounts) {
    println!("{}", format_counts(label, counts));
}

fn print_failures(results: &BatchResults) {
    if results.failure_count() == 0 {
        return;
    }

    eprintln!("\nFailed Files:");
    for failure in &results.failures {
        eprintln!(
            "  {} [{}]: {}",
            failure.path.display(),
            failure.error.error_code(),
            failure.error
        );
    }
    eprintln!("{}", results.summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&[
            "--json",
            "--pretty",
            "--threads",
            "4",
            "--no-recursive",
            "--config",
            "tok.toml",
        ]))
        .unwrap();

        assert!(options.json && options.pretty);
        assert_eq!(options.threads, Some(4));
        assert_eq!(options.recursive, Some(false));
        assert_eq!(options.config_file.as_deref(), Some("tok.toml"));
    }

    #[test]
    fn test_parse_options_invalid() {
        assert!(parse_options(&args(&["--threads", "many"])).is_err());
        assert!(parse_options(&args(&["--threads"])).is_err());
        assert!(parse_options(&args(&["--log-level", "loud"])).is_err());
        assert_eq!(
            parse_options(&args(&["--unknown-option"])).unwrap(),
            CliOptions::default()
        );
    }

    #[test]
    fn test_format_counts_lists_every_kind() {
        let counts = TokenCounts::from_tokens(&lexical::tokenize("val x += 1"));
        assert_eq!(
            format_counts("A.scala", &counts),
            "A.scala: 4 tokens (RESERVED 1, IDENTIFIER 1, LITERAL 1, OPERATOR 1, merged 1)"
        );
    }

    #[test]
    fn test_overrides_apply_to_preferences() {
        let mut preferences = RuntimePreferences::default();
        let options = parse_options(&args(&[
            "--threads",
            "2",
            "--fail-fast",
            "--log-json",
            "--quiet",
        ]))
        .unwrap();

        apply_overrides(&mut preferences, &options);
        assert_eq!(preferences.batch.max_threads, 2);
        assert!(preferences.batch.fail_fast);
        assert!(preferences.logging.use_structured_logging);
        assert_eq!(preferences.logging.min_log_level, LogLevel::Error);
    }
}
