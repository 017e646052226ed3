//! `lun-grammar`: inspect the bundled Lun grammar or check a `grammar.json`.

use facet::Facet;
use std::fs;
use std::process::ExitCode;
use tree_sitter_lun::{
    parse_grammar, validate, GrammarError, SymbolKind, SymbolTable, LANGUAGE_INFO,
};

/// Command-line arguments.
#[derive(Facet)]
struct Args {
    /// A `grammar.json` to check instead of the bundled Lun grammar.
    #[facet(positional, default)]
    grammar: Option<String>,

    /// Rule that roots the grammar.
    #[facet(named, default)]
    start: Option<String>,

    /// Print the symbol table.
    #[facet(named, short = 's', default)]
    symbols: bool,

    /// Print the field table.
    #[facet(named, short = 'f', default)]
    fields: bool,

    /// Print the keywords.
    #[facet(named, short = 'k', default)]
    keywords: bool,

    /// Print every table as one JSON object instead.
    #[facet(named, default)]
    json: bool,
}

/// What gets printed, independent of where the tables came from.
struct Summary<'a> {
    name: &'a str,
    symbols: Vec<(&'a str, SymbolKind)>,
    fields: Vec<&'a str>,
    keywords: Vec<&'a str>,
}

#[derive(Facet)]
struct JsonSummary {
    name: String,
    symbols: Vec<JsonSymbol>,
    fields: Vec<String>,
    keywords: Vec<String>,
}

#[derive(Facet)]
struct JsonSymbol {
    id: usize,
    name: String,
    kind: String,
    named: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
    let args: Args = match facet_args::from_slice(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let Some(path) = &args.grammar else {
        let lun = &LANGUAGE_INFO;
        let summary = Summary {
            name: lun.name(),
            symbols: lun.symbols().iter().map(|s| (s.name(), s.kind())).collect(),
            fields: lun.field_names().to_vec(),
            keywords: lun.keywords().to_vec(),
        };
        print_summary(&summary, args);
        return Ok(());
    };

    let json = fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    let grammar = parse_grammar(&json).map_err(|e| format!("{path}: {e}"))?;
    let start = args.start.as_deref().unwrap_or("source_file");
    let report = validate(&grammar, start)
        .map_err(|e| format!("{path}: {}", GrammarError::from(e)))?;
    tracing::info!(
        grammar = %grammar.name,
        rules = grammar.rules.len(),
        unreachable = report.unreachable.len(),
        "grammar is valid"
    );

    let table = SymbolTable::from_grammar(&grammar, start);
    let summary = Summary {
        name: &grammar.name,
        symbols: table
            .symbols()
            .iter()
            .map(|s| (s.name.as_str(), s.kind))
            .collect(),
        fields: table.fields().iter().map(String::as_str).collect(),
        keywords: table.keywords().iter().map(String::as_str).collect(),
    };
    print_summary(&summary, args);
    Ok(())
}

fn print_summary(summary: &Summary<'_>, args: &Args) {
    if args.json {
        println!("{}", facet_json::to_string(&summary.to_json()));
        return;
    }

    println!("name: {}", summary.name);
    println!("symbols: {}", summary.symbols.len());
    println!("fields: {}", summary.fields.len());
    println!("keywords: {}", summary.keywords.len());

    if args.symbols {
        println!();
        for (id, (name, kind)) in summary.symbols.iter().enumerate() {
            let kind = format!("{kind:?}");
            println!("{id:>4}  {kind:<9}  {name:?}");
        }
    }
    if args.fields {
        println!();
        for (index, name) in summary.fields.iter().enumerate() {
            println!("{:>4}  {name}", index + 1);
        }
    }
    if args.keywords {
        println!();
        println!("{}", summary.keywords.join(" "));
    }
}

impl Summary<'_> {
    fn to_json(&self) -> JsonSummary {
        JsonSummary {
            name: self.name.to_owned(),
            symbols: self
                .symbols
                .iter()
                .enumerate()
                .map(|(id, (name, kind))| JsonSymbol {
                    id,
                    name: (*name).to_owned(),
                    kind: format!("{kind:?}"),
                    named: kind.is_named(),
                })
                .collect(),
            fields: self.fields.iter().map(|f| (*f).to_owned()).collect(),
            keywords: self.keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }
}
